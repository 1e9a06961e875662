//! Unified path management for Shadow Regent files.
//!
//! Everything the client writes lives under two roots resolved with `dirs`,
//! or under a single root when the user passes `--data-dir`.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/shadow-regent/     # Config directory
//! └── config.toml              # ClientConfig
//!
//! ~/.local/share/shadow-regent/ # Data directory
//! ├── storage.json             # Durable key-value store
//! └── logs/                    # Daily rolling client logs
//!     └── regent.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "shadow-regent";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform reported no config or data directory.
    PlatformDirNotFound(&'static str),
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::PlatformDirNotFound(kind) => {
                write!(f, "Cannot find platform {} directory", kind)
            }
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for regent_core::RegentError {
    fn from(err: PathError) -> Self {
        regent_core::RegentError::config(err.to_string())
    }
}

/// Resolved locations for config, storage and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegentPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl RegentPaths {
    /// Platform defaults (XDG on Linux, the native locations elsewhere).
    ///
    /// # Errors
    ///
    /// Returns `PathError::PlatformDirNotFound` when the home directory
    /// cannot be determined.
    pub fn platform() -> Result<Self, PathError> {
        let config_dir = dirs::config_dir()
            .ok_or(PathError::PlatformDirNotFound("config"))?
            .join(APP_DIR);
        let data_dir = dirs::data_dir()
            .ok_or(PathError::PlatformDirNotFound("data"))?
            .join(APP_DIR);
        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Puts config, storage and logs under one directory.
    pub fn rooted(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            config_dir: root.clone(),
            data_dir: root,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// The single JSON file backing `FileKeyValueStore`.
    pub fn storage_file(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooted_layout() {
        let paths = RegentPaths::rooted("/tmp/regent");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/regent/config.toml"));
        assert_eq!(paths.storage_file(), PathBuf::from("/tmp/regent/storage.json"));
        assert_eq!(paths.logs_dir(), PathBuf::from("/tmp/regent/logs"));
    }

    #[test]
    fn test_platform_dirs_are_app_scoped() {
        if let Ok(paths) = RegentPaths::platform() {
            assert!(paths.config_dir().ends_with(APP_DIR));
            assert!(paths.data_dir().ends_with(APP_DIR));
        }
    }
}
