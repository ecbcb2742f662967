//! Tunables for the simulation and the quarry that drives it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric configuration read by the simulator and the host machine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Virtual blocks sampled by one mining operation.
    pub blocks_per_operation: u32,
    /// Depths are drawn uniformly from `0..virtual_world_height`.
    pub virtual_world_height: u32,
    /// Ticks per operation without efficiency.
    pub base_ticks_per_operation: u32,
    /// Lower bound on ticks per operation.
    pub min_ticks_per_operation: u32,
    /// Fractional tick reduction per efficiency level.
    pub efficiency_speed_bonus: f64,
    /// Energy per operation without efficiency.
    pub energy_per_operation: u32,
    /// Quarry energy buffer size.
    pub energy_capacity: u32,
    /// Maximum energy accepted per tick.
    pub energy_transfer_rate: u32,
    /// Pending output stacks above which the quarry pauses.
    pub max_pending_output: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            blocks_per_operation: 16,
            virtual_world_height: 256,
            base_ticks_per_operation: 100,
            min_ticks_per_operation: 10,
            efficiency_speed_bonus: 0.15,
            energy_per_operation: 1000,
            energy_capacity: 1_000_000,
            energy_transfer_rate: 10_000,
            max_pending_output: 100,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Depth draws need a non-empty range.
    #[error("virtual_world_height must be greater than zero")]
    ZeroWorldHeight,
    /// The tick floor cannot exceed the base.
    #[error("min_ticks_per_operation ({min}) exceeds base_ticks_per_operation ({base})")]
    TickFloorAboveBase {
        /// Configured floor.
        min: u32,
        /// Configured base.
        base: u32,
    },
    /// Speed bonus must be a finite, non-negative fraction.
    #[error("efficiency_speed_bonus must be finite and >= 0, got {0}")]
    InvalidSpeedBonus(f64),
}

impl SimulationConfig {
    /// Check values the simulator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.virtual_world_height == 0 {
            return Err(ConfigError::ZeroWorldHeight);
        }
        if self.min_ticks_per_operation > self.base_ticks_per_operation {
            return Err(ConfigError::TickFloorAboveBase {
                min: self.min_ticks_per_operation,
                base: self.base_ticks_per_operation,
            });
        }
        if !self.efficiency_speed_bonus.is_finite() || self.efficiency_speed_bonus < 0.0 {
            return Err(ConfigError::InvalidSpeedBonus(self.efficiency_speed_bonus));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_tick_bounds() {
        let cfg = SimulationConfig {
            base_ticks_per_operation: 5,
            min_ticks_per_operation: 10,
            ..SimulationConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::TickFloorAboveBase { min: 10, base: 5 })
        );
    }

    #[test]
    fn rejects_zero_height_and_bad_bonus() {
        let cfg = SimulationConfig {
            virtual_world_height: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroWorldHeight));

        let cfg = SimulationConfig {
            efficiency_speed_bonus: f64::NAN,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidSpeedBonus(_))
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: SimulationConfig = toml::from_str("blocks_per_operation = 100").unwrap();
        assert_eq!(cfg.blocks_per_operation, 100);
        assert_eq!(cfg.virtual_world_height, 256);
    }
}
