//! Search configuration, loadable from TOML.

use sensei_othello::Board;
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: u32 },
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Log2 of the number of transposition table slots.
    pub hash_map_bits: u8,
    /// Positions with at most this many empties are solved exactly.
    pub exact_solve_empties: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hash_map_bits: 20,
            exact_solve_empties: 8,
        }
    }
}

impl SearchConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        log::debug!("Loaded search config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=30).contains(&self.hash_map_bits) {
            return Err(ConfigError::Invalid {
                field: "hash_map_bits",
                value: self.hash_map_bits.into(),
            });
        }
        if self.exact_solve_empties > 20 {
            return Err(ConfigError::Invalid {
                field: "exact_solve_empties",
                value: self.exact_solve_empties.into(),
            });
        }
        Ok(())
    }

    /// Whether `board` is shallow enough for the exact solver.
    #[inline]
    pub fn solves_exactly(&self, board: Board) -> bool {
        board.count_empty() <= self.exact_solve_empties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config = SearchConfig::from_toml("").unwrap();
        assert_eq!(config, SearchConfig::default());
    }

    #[test]
    fn partial_config() {
        let config = SearchConfig::from_toml("hash_map_bits = 12").unwrap();
        assert_eq!(config.hash_map_bits, 12);
        assert_eq!(config.exact_solve_empties, 8);
    }

    #[test]
    fn invalid_values() {
        let error = SearchConfig::from_toml("hash_map_bits = 0").unwrap_err();
        assert_eq!(error.to_string(), "invalid hash_map_bits: 0");
        let error = SearchConfig::from_toml("exact_solve_empties = 21").unwrap_err();
        assert_eq!(error.to_string(), "invalid exact_solve_empties: 21");
        assert!(matches!(
            SearchConfig::from_toml("hash_map_bits = -3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SearchConfig::from_toml("hash_bits = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn solves_exactly() {
        let config = SearchConfig::default();
        assert!(!config.solves_exactly(Board::new()));
        let full = Board::from_bitboards(
            sensei_othello::Bitboard::from(0xffff_ffffu64),
            sensei_othello::Bitboard::from(0xffff_ffff_0000_0000u64),
        );
        assert!(config.solves_exactly(full));
    }
}
