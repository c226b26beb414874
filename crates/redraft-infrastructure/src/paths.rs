//! Unified path management for redraft data and configuration.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/redraft/           # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/redraft/      # Data directory
//! ├── documents/               # One TOML file per document and its versions
//! ├── sessions/                # One TOML file per chat session
//! └── logs/                    # Application logs
//!     └── redraft.log.YYYY-MM-DD
//! ```
//!
//! A base override (the CLI's `--data-dir`) puts everything, `config.toml`
//! included, under one directory.

use std::path::PathBuf;
use thiserror::Error;

const APP_NAME: &str = "redraft";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Home directory could not be determined.
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

impl From<PathError> for redraft_core::RedraftError {
    fn from(err: PathError) -> Self {
        redraft_core::RedraftError::config(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RedraftPaths {
    base_dir: Option<PathBuf>,
}

impl RedraftPaths {
    /// Creates a resolver. `None` uses the platform directories.
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn documents_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("documents"))
    }

    pub fn sessions_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("sessions"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_override_places_everything_under_base() {
        let paths = RedraftPaths::new(Some(PathBuf::from("/tmp/redraft-test")));

        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/redraft-test/config.toml")
        );
        assert_eq!(
            paths.documents_dir().unwrap(),
            PathBuf::from("/tmp/redraft-test/documents")
        );
        assert_eq!(
            paths.sessions_dir().unwrap(),
            PathBuf::from("/tmp/redraft-test/sessions")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/redraft-test/logs")
        );
    }

    #[test]
    fn test_platform_dirs_end_with_app_name() {
        let paths = RedraftPaths::default();
        if let Ok(dir) = paths.data_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }
}
