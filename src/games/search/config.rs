//! Search-duel scoring constants.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EngineResult};

/// Scoring constants for one search-duel Round.
///
/// Percentages apply to a participant's post-visa baseline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Visa cost as a percentage of the entrant's own score.
    pub visa_percent: i64,
    /// Visa cost drawn from the shared pool instead.
    pub visa_fixed: u64,
    /// Tokens everyone may carry legally.
    pub legal_tokens: u32,
    pub max_tokens: u32,
    /// Searcher's gain per illegal token found (%).
    pub gain_per_illegal_found: i64,
    /// Smuggler's loss per illegal token caught (%).
    pub loss_per_illegal_caught: i64,
    /// Smuggler's gain per illegal token passed unsearched (%).
    pub gain_per_illegal_passed: i64,
    /// Searcher's flat loss when the target was legal (%).
    pub loss_search_no_illegal: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            visa_percent: 10,
            visa_fixed: 50,
            legal_tokens: 20,
            max_tokens: 30,
            gain_per_illegal_found: 10,
            loss_per_illegal_caught: 5,
            gain_per_illegal_passed: 5,
            loss_search_no_illegal: 10,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_visa(mut self, percent: i64, fixed: u64) -> Self {
        self.visa_percent = percent;
        self.visa_fixed = fixed;
        self
    }

    #[must_use]
    pub fn with_tokens(mut self, legal: u32, max: u32) -> Self {
        self.legal_tokens = legal;
        self.max_tokens = max;
        self
    }

    #[must_use]
    pub fn with_search_rates(mut self, found: i64, caught: i64, passed: i64, no_illegal: i64) -> Self {
        self.gain_per_illegal_found = found;
        self.loss_per_illegal_caught = caught;
        self.gain_per_illegal_passed = passed;
        self.loss_search_no_illegal = no_illegal;
        self
    }

    /// Illegal tokens in an entering count.
    #[must_use]
    pub fn illegal(&self, tokens: u32) -> u32 {
        tokens.saturating_sub(self.legal_tokens)
    }

    /// Fail with `OutOfRange` unless `tokens` is an allowed entering count.
    pub fn ensure_entering(&self, tokens: u32) -> EngineResult<()> {
        self.ensure_between(tokens, self.legal_tokens)
    }

    /// Fail unless `tokens` is a forced-illegal count (at least one illegal).
    pub fn ensure_forced_illegal(&self, tokens: u32) -> EngineResult<()> {
        self.ensure_between(tokens, self.legal_tokens.saturating_add(1))
    }

    fn ensure_between(&self, tokens: u32, min: u32) -> EngineResult<()> {
        if (min..=self.max_tokens).contains(&tokens) {
            Ok(())
        } else {
            Err(EngineError::out_of_range("tokens", tokens, min, self.max_tokens))
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.legal_tokens >= self.max_tokens {
            return Err(EngineError::InvalidConfig(format!(
                "max_tokens {} must exceed legal_tokens {}",
                self.max_tokens, self.legal_tokens
            )));
        }
        if !(0..=100).contains(&self.visa_percent) {
            return Err(EngineError::InvalidConfig(format!(
                "visa_percent {} is outside 0..=100",
                self.visa_percent
            )));
        }
        let rates = [
            self.gain_per_illegal_found,
            self.loss_per_illegal_caught,
            self.gain_per_illegal_passed,
            self.loss_search_no_illegal,
        ];
        if rates.iter().any(|&r| !(0..=100).contains(&r)) {
            return Err(EngineError::InvalidConfig("search rates must be within 0..=100".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.illegal(25), 5);
        assert_eq!(config.illegal(20), 0);
    }

    #[test]
    fn test_entering_bounds() {
        let config = SearchConfig::default();
        assert!(config.ensure_entering(20).is_ok());
        assert!(config.ensure_entering(30).is_ok());
        assert!(matches!(
            config.ensure_entering(31),
            Err(EngineError::OutOfRange { min: 20, max: 30, .. })
        ));
        assert!(config.ensure_entering(19).is_err());
    }

    #[test]
    fn test_forced_illegal_bounds() {
        let config = SearchConfig::default();
        assert!(config.ensure_forced_illegal(20).is_err());
        assert!(config.ensure_forced_illegal(21).is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        assert!(SearchConfig::default().with_tokens(30, 30).validate().is_err());
        assert!(SearchConfig::default().with_visa(120, 0).validate().is_err());
        assert!(SearchConfig::default()
            .with_search_rates(10, -5, 5, 10)
            .validate()
            .is_err());
    }

    #[test]
    fn test_json_overrides() {
        let config: SearchConfig = serde_json::from_str(r#"{"visa_fixed":80}"#).unwrap();
        assert_eq!(config.visa_fixed, 80);
        assert_eq!(config.legal_tokens, 20);
    }
}
