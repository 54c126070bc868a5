use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found — set $HOME environment variable")]
    HomeNotFound,
}

/// Centralized path construction for the `${HOME}/.config/dev-peace/` layout.
///
/// Single source of truth for every path under the config directory. Use
/// [`DevPeacePaths::resolve`] in production code and [`DevPeacePaths::from_dir`]
/// in tests.
#[derive(Debug, Clone)]
pub struct DevPeacePaths {
    config_dir: PathBuf,
}

impl DevPeacePaths {
    /// Resolve paths from the user's home directory (`~/.config/dev-peace`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            config_dir: home.join(".config").join("dev-peace"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// The base `${config_dir}` directory.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    pub fn database_file(&self) -> PathBuf {
        self.config_dir.join("database.db")
    }
}
