use serde::{Deserialize, Serialize};

/// Smallest accepted bomb count.
pub const MIN_BOMBS: usize = 2;
/// Largest accepted bomb count.
pub const MAX_BOMBS: usize = 7;
/// Quick-select options offered by the settings UI.
pub const BOMB_PRESETS: [usize; 4] = [2, 3, 5, 7];

/// Parameters for one round.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct GameParams {
    pub bombs: usize,
    pub bet: u64,
}

impl Default for GameParams {
    fn default() -> Self {
        Self { bombs: 2, bet: 100 }
    }
}

/// Tunable constants for the display-probability heuristic.
///
/// The defaults reproduce the tight "97-99% confidence" band; [`wide`]
/// gives the looser variant. None of this is statistically meaningful,
/// the numbers only shape how the overlay looks.
///
/// [`wide`]: PredictorConfig::wide
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Added per revealed safe neighbor with zero adjacent bombs.
    pub clear_bonus: i32,
    /// Subtracted per adjacent bomb of each revealed safe neighbor.
    pub crowd_penalty: i32,
    /// Flat bonus once any safe cell has been revealed.
    pub reveal_bonus: i32,
    /// Lower clamp for hidden safe cells.
    pub floor: u8,
    /// Upper clamp for hidden safe cells.
    pub ceiling: u8,
    /// Displayed range for hidden bombs. Kept above zero so the overlay
    /// never states ground truth outright.
    pub bomb_display_min: u8,
    pub bomb_display_max: u8,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            clear_bonus: 15,
            crowd_penalty: 8,
            reveal_bonus: 5,
            floor: 97,
            ceiling: 99,
            bomb_display_min: 1,
            bomb_display_max: 3,
        }
    }
}

impl PredictorConfig {
    /// The wide-band variant: scores spread across [10, 95] instead of
    /// collapsing into the 97-99 corner.
    pub fn wide() -> Self {
        Self {
            floor: 10,
            ceiling: 95,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_default_matches_presets() {
        let params = GameParams::default();
        assert!(BOMB_PRESETS.contains(&params.bombs));
        assert!(params.bet >= 1);
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: GameParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.bombs, 2);
        assert_eq!(params.bet, 100);

        let params: GameParams = serde_json::from_str(r#"{"bombs":5}"#).unwrap();
        assert_eq!(params.bombs, 5);
        assert_eq!(params.bet, 100);
    }

    #[test]
    fn bands_are_ordered() {
        for config in [PredictorConfig::default(), PredictorConfig::wide()] {
            assert!(config.floor <= config.ceiling);
            assert!(config.ceiling <= 100);
            assert!(config.bomb_display_min >= 1);
            assert!(config.bomb_display_min <= config.bomb_display_max);
            assert!((config.bomb_display_max as i32) < config.floor as i32);
        }
    }
}
