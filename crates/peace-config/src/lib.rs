//! Configuration layer for dev-peace: types, JSON file loading, and legacy
//! shape migration for `${config_dir}/config.json`.

pub mod errors;
pub mod loading;
pub mod types;

pub use errors::ConfigError;
pub use loading::{load_or_init, save};
pub use types::{
    DevPeaceConfig, FromSpec, MonitoringConfig, StatusAutomationConfig, StatusEvent,
    TransitionRule,
};

use peace_paths::DevPeacePaths;

impl DevPeaceConfig {
    /// Load the configuration for `paths`, creating it with defaults on
    /// first run.
    pub fn load(paths: &DevPeacePaths) -> Result<Self, ConfigError> {
        load_or_init(&paths.config_file())
    }

    /// Persist this configuration to `paths`, writing atomically.
    pub fn save(&self, paths: &DevPeacePaths) -> Result<(), ConfigError> {
        save(&paths.config_file(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_creates_then_reloads_same_values() {
        let dir = tempdir().unwrap();
        let paths = DevPeacePaths::from_dir(dir.path().to_path_buf());

        let first = DevPeaceConfig::load(&paths).unwrap();
        let second = DevPeaceConfig::load(&paths).unwrap();
        assert_eq!(first, second);
    }
}
