//! Data-driven generator balance
//!
//! Every knob the procedural track generator reads lives in `GeneratorConfig`,
//! so custom difficulties can be authored as JSON and validated before use.

use serde::{Deserialize, Serialize};

/// Error type for tuning and settings loading
#[derive(Debug)]
pub enum ConfigError {
    ParseError(serde_json::Error),
    ValidationError(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::ParseError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ParseError(e) => Some(e),
            ConfigError::ValidationError(_) => None,
        }
    }
}

/// Obstacle segment widths, as fractions of the row width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSize {
    pub min: f32,
    pub max: f32,
    /// Probability of drawing from the wide end of the range
    pub large_chance: f32,
}

/// Procedural generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Vertical gap between rows, drawn uniformly from [min, max]
    pub row_gap: (f32, f32),
    /// Relative weight of collectibles among the free slots
    pub collectible_weight: f32,
    /// Relative weight of hazards among the free slots
    pub hazard_weight: f32,
    /// Obstacle segments per row, inclusive range
    pub obstacle_segments: (usize, usize),
    pub obstacle_size: ObstacleSize,
    /// Fraction of each row that stays truly empty
    pub empty_frac_min: f32,
    pub empty_frac_max: f32,
    /// Floor on (empty + collectible) columns once hazards are assigned
    pub open_frac_min: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::relaxed()
    }
}

impl GeneratorConfig {
    /// Generous rows: few, narrow obstacles and plenty of jugs
    pub fn relaxed() -> Self {
        Self {
            row_gap: (140.0, 190.0),
            collectible_weight: 3.0,
            hazard_weight: 1.0,
            obstacle_segments: (2, 3),
            obstacle_size: ObstacleSize {
                min: 0.15,
                max: 0.26,
                large_chance: 0.25,
            },
            empty_frac_min: 0.30,
            empty_frac_max: 0.50,
            open_frac_min: 0.40,
        }
    }

    /// Dense rows: wide walls, mostly hazards, narrow safe paths
    pub fn hard() -> Self {
        Self {
            row_gap: (110.0, 165.0),
            collectible_weight: 1.0,
            hazard_weight: 3.0,
            obstacle_segments: (3, 5),
            obstacle_size: ObstacleSize {
                min: 0.22,
                max: 0.40,
                large_chance: 0.65,
            },
            empty_frac_min: 0.10,
            empty_frac_max: 0.20,
            open_frac_min: 0.15,
        }
    }

    /// Share of free slots that should become hazards
    pub fn hazard_share(&self) -> f32 {
        let total = self.collectible_weight + self.hazard_weight;
        if total <= 0.0 {
            0.0
        } else {
            self.hazard_weight / total
        }
    }

    /// Parse and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs the generator cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (gap_min, gap_max) = self.row_gap;
        if !gap_min.is_finite() || !gap_max.is_finite() || gap_min <= 0.0 || gap_max < gap_min {
            return Err(ConfigError::ValidationError(format!(
                "row_gap must be a positive range, got ({}, {})",
                gap_min, gap_max
            )));
        }
        if self.collectible_weight < 0.0 || self.hazard_weight < 0.0 {
            return Err(ConfigError::ValidationError(
                "weights must be non-negative".to_string(),
            ));
        }
        let (seg_min, seg_max) = self.obstacle_segments;
        if seg_max < seg_min {
            return Err(ConfigError::ValidationError(format!(
                "obstacle_segments range is inverted ({}, {})",
                seg_min, seg_max
            )));
        }
        let size = &self.obstacle_size;
        if !(0.0..=1.0).contains(&size.min)
            || !(0.0..=1.0).contains(&size.max)
            || size.max < size.min
            || !(0.0..=1.0).contains(&size.large_chance)
        {
            return Err(ConfigError::ValidationError(format!(
                "obstacle_size out of range: {:?}",
                size
            )));
        }
        for (name, frac) in [
            ("empty_frac_min", self.empty_frac_min),
            ("empty_frac_max", self.empty_frac_max),
            ("open_frac_min", self.open_frac_min),
        ] {
            if !(0.0..=1.0).contains(&frac) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be within [0, 1], got {}",
                    name, frac
                )));
            }
        }
        if self.empty_frac_max < self.empty_frac_min {
            return Err(ConfigError::ValidationError(
                "empty_frac_max is below empty_frac_min".to_string(),
            ));
        }
        Ok(())
    }
}
