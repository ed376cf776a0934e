//! Deterministic duel pairing and challenger selection.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EngineResult, PlayerId};

/// Team membership. Seats without a team never share one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    members: FxHashMap<PlayerId, u16>,
}

impl Teams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, player: PlayerId, team: u16) {
        self.members.insert(player, team);
    }

    #[must_use]
    pub fn team_of(&self, player: PlayerId) -> Option<u16> {
        self.members.get(&player).copied()
    }

    #[must_use]
    pub fn same_team(&self, a: PlayerId, b: PlayerId) -> bool {
        a == b || matches!((self.team_of(a), self.team_of(b)), (Some(x), Some(y)) if x == y)
    }
}

/// Duels generated for a roster, in play order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub duels: Vec<(PlayerId, PlayerId)>,
    /// The seat left without an opponent on an odd roster.
    pub unpaired: Option<PlayerId>,
}

impl Pairing {
    /// Pair `seats` greedily in ascending order, never within a team.
    ///
    /// Each seat still free takes the lowest later free seat of another
    /// team. Fails when more than one seat stays free, or when the free
    /// seat could never face a challenger.
    pub fn generate(seats: &[PlayerId], teams: &Teams) -> EngineResult<Self> {
        let mut ordered = seats.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut taken = vec![false; ordered.len()];
        let mut duels = Vec::with_capacity(ordered.len() / 2);
        let mut free = Vec::new();

        for i in 0..ordered.len() {
            if taken[i] {
                continue;
            }
            taken[i] = true;
            let me = ordered[i];
            let partner = (i + 1..ordered.len()).find(|&j| !taken[j] && !teams.same_team(me, ordered[j]));
            match partner {
                Some(j) => {
                    taken[j] = true;
                    duels.push((me, ordered[j]));
                }
                None => free.push(me),
            }
        }

        match free.as_slice() {
            [] => Ok(Self { duels, unpaired: None }),
            [one] => {
                let pairing = Self {
                    duels,
                    unpaired: Some(*one),
                };
                if pairing.paired().any(|p| !teams.same_team(p, *one)) {
                    Ok(pairing)
                } else {
                    Err(EngineError::InvalidConfig(format!(
                        "{one} has no eligible challenger"
                    )))
                }
            }
            many => Err(EngineError::InvalidConfig(format!(
                "pairing leaves {} seats without an opponent",
                many.len()
            ))),
        }
    }

    /// Every seat that plays a generated duel.
    pub fn paired(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.duels.iter().flat_map(|&(a, b)| [a, b])
    }
}

/// The participant forced into the final duel against `unpaired`.
///
/// Lowest net duel delta wins the dubious honour, ties go to the lowest
/// seat. Team mates of `unpaired` are skipped.
#[must_use]
pub fn select_challenger(
    net_deltas: impl IntoIterator<Item = (PlayerId, i64)>,
    unpaired: PlayerId,
    teams: &Teams,
) -> Option<PlayerId> {
    net_deltas
        .into_iter()
        .filter(|&(p, _)| !teams.same_team(p, unpaired))
        .min_by_key(|&(p, delta)| (delta, p))
        .map(|(p, _)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(n: u8) -> Vec<PlayerId> {
        (0..n).map(PlayerId::new).collect()
    }

    #[test]
    fn test_even_roster_pairs_neighbours() {
        let pairing = Pairing::generate(&seats(4), &Teams::new()).unwrap();
        assert_eq!(
            pairing.duels,
            vec![
                (PlayerId::new(0), PlayerId::new(1)),
                (PlayerId::new(2), PlayerId::new(3))
            ]
        );
        assert_eq!(pairing.unpaired, None);
    }

    #[test]
    fn test_odd_roster_leaves_last_seat() {
        let pairing = Pairing::generate(&seats(5), &Teams::new()).unwrap();
        assert_eq!(pairing.duels.len(), 2);
        assert_eq!(pairing.unpaired, Some(PlayerId::new(4)));
    }

    #[test]
    fn test_team_mates_never_meet() {
        let mut teams = Teams::new();
        teams.assign(PlayerId::new(0), 1);
        teams.assign(PlayerId::new(1), 1);
        teams.assign(PlayerId::new(2), 2);
        teams.assign(PlayerId::new(3), 2);

        let pairing = Pairing::generate(&seats(4), &teams).unwrap();
        for (a, b) in &pairing.duels {
            assert!(!teams.same_team(*a, *b));
        }
        assert_eq!(pairing.duels[0], (PlayerId::new(0), PlayerId::new(2)));
    }

    #[test]
    fn test_single_team_roster_is_rejected() {
        let mut teams = Teams::new();
        for p in seats(3) {
            teams.assign(p, 7);
        }
        assert!(matches!(
            Pairing::generate(&seats(3), &teams),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_challenger_lowest_delta_then_lowest_seat() {
        let deltas = [
            (PlayerId::new(0), 20),
            (PlayerId::new(1), -10),
            (PlayerId::new(2), 5),
            (PlayerId::new(3), -10),
        ];
        let teams = Teams::new();
        assert_eq!(
            select_challenger(deltas, PlayerId::new(4), &teams),
            Some(PlayerId::new(1))
        );
    }

    #[test]
    fn test_challenger_skips_unpaired_team() {
        let mut teams = Teams::new();
        teams.assign(PlayerId::new(1), 3);
        teams.assign(PlayerId::new(4), 3);
        let deltas = [(PlayerId::new(0), 20), (PlayerId::new(1), -10)];
        assert_eq!(
            select_challenger(deltas, PlayerId::new(4), &teams),
            Some(PlayerId::new(0))
        );
    }
}
