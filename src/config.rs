//! Quarry configuration loaded from `config/quarry.toml`.

use quarrysim_sim::SimulationConfig;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Default location of the quarry configuration.
pub const DEFAULT_CONFIG_PATH: &str = "config/quarry.toml";

/// Load the configuration from the default path.
pub fn load() -> SimulationConfig {
    load_from_path(Path::new(DEFAULT_CONFIG_PATH))
}

/// Load configuration from an explicit path, falling back to defaults on
/// read, parse or validation errors.
pub fn load_from_path(path: &Path) -> SimulationConfig {
    let config = match fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<SimulationConfig>(&contents) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                return SimulationConfig::default();
            }
        },
        Err(err) => {
            warn!("Failed to read {}: {err}. Using defaults", path.display());
            return SimulationConfig::default();
        }
    };

    if let Err(err) = config.validate() {
        warn!("Invalid quarry config {}: {err}. Using defaults", path.display());
        return SimulationConfig::default();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("quarrysim-{name}-{nanos}.toml"))
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = load_from_path(Path::new("does/not/exist/quarry.toml"));
        assert_eq!(cfg, SimulationConfig::default());
    }

    #[test]
    fn unreadable_path_uses_defaults() {
        let dir = std::env::temp_dir();
        assert!(dir.is_dir());
        assert_eq!(load_from_path(&dir), SimulationConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_path("partial");
        fs::write(&path, "blocks_per_operation = 4\nenergy_per_operation = 250\n").unwrap();
        let cfg = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(cfg.blocks_per_operation, 4);
        assert_eq!(cfg.energy_per_operation, 250);
        assert_eq!(cfg.virtual_world_height, 256);
        assert_eq!(cfg.max_pending_output, 100);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let path = temp_path("invalid");
        fs::write(&path, "base_ticks_per_operation = 5\nmin_ticks_per_operation = 50\n").unwrap();
        let cfg = load_from_path(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(cfg, SimulationConfig::default());

        let path = temp_path("garbage");
        fs::write(&path, "blocks_per_operation = \"many\"").unwrap();
        let cfg = load_from_path(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(cfg, SimulationConfig::default());
    }
}
