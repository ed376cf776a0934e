//! Seat identity and per-seat storage.
//!
//! ## PlayerId
//!
//! A participant's seat within one Round. Seats are assigned in join order
//! starting at 0; the identity collaborator maps users onto seats, the engine
//! only ever sees seats. Seat order doubles as the tie-break order.
//!
//! ## PlayerMap
//!
//! Per-seat storage backed by a `Vec` for O(1) access.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat identifier supporting 1-255 participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new seat ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over the seats of a Round with `count` participants.
    ///
    /// ```
    /// use duel_rounds::core::PlayerId;
    ///
    /// let seats: Vec<_> = PlayerId::all(3).collect();
    /// assert_eq!(seats, vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]);
    /// ```
    pub fn all(count: usize) -> impl Iterator<Item = PlayerId> {
        (0..count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Per-seat data with O(1) access, one entry per seat.
///
/// ```
/// use duel_rounds::core::{PlayerId, PlayerMap};
///
/// let mut scores: PlayerMap<i64> = PlayerMap::new(2, |_| 100);
/// scores[PlayerId::new(1)] -= 30;
/// assert_eq!(scores[PlayerId::new(1)], 70);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Build a map from a factory called once per seat.
    pub fn new(count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        debug_assert!(count <= 255, "At most 255 seats supported");
        Self {
            data: PlayerId::all(count).map(factory).collect(),
        }
    }

    /// Build a map from values already in seat order.
    pub fn from_vec(data: Vec<T>) -> Self {
        debug_assert!(data.len() <= 255, "At most 255 seats supported");
        Self { data }
    }

    /// Number of seats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `player` has a seat in this map.
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        player.index() < self.data.len()
    }

    /// Checked access.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Checked mutable access.
    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over all seats.
    pub fn seats(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.data.len())
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display_and_order() {
        assert_eq!(PlayerId::new(3).to_string(), "P3");
        assert!(PlayerId::new(1) < PlayerId::new(2));
    }

    #[test]
    fn test_player_map_checked_access() {
        let map: PlayerMap<i64> = PlayerMap::new(2, |p| p.index() as i64 * 10);

        assert_eq!(map.get(PlayerId::new(1)), Some(&10));
        assert_eq!(map.get(PlayerId::new(2)), None);
        assert!(map.contains(PlayerId::new(0)));
        assert!(!map.contains(PlayerId::new(5)));
    }

    #[test]
    fn test_player_map_iter_in_seat_order() {
        let map = PlayerMap::from_vec(vec!['a', 'b', 'c']);
        let pairs: Vec<_> = map.iter().collect();

        assert_eq!(pairs[0], (PlayerId::new(0), &'a'));
        assert_eq!(pairs[2], (PlayerId::new(2), &'c'));
        assert_eq!(map.seats().count(), 3);
    }

    #[test]
    fn test_player_map_serialization() {
        let map: PlayerMap<i32> = PlayerMap::new(2, |p| p.index() as i32 + 1);
        let json = serde_json::to_string(&map).unwrap();
        let back: PlayerMap<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }
}
