//! Resource service configuration.
//!
//! The storage root for managed resources comes from `MIMEREG_STORAGE_DIR` if set,
//! otherwise from the platform data directory (`~/.local/share/mimereg/resources` on Linux).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{ResourceError, ResourceErrorKind, ResourceResult};

pub const STORAGE_DIR_ENV: &str = "MIMEREG_STORAGE_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    storage_root: PathBuf,
}

impl ServiceConfig {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    /// Reads the configuration from the environment, falling back to the platform data
    /// directory.
    pub fn from_env() -> ResourceResult<Self> {
        let storage_root = std::env::var_os(STORAGE_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                ProjectDirs::from("", "", "mimereg")
                    .map(|dirs| dirs.data_dir().join("resources"))
            })
            .ok_or_else(|| {
                ResourceError::new(
                    ResourceErrorKind::Failed,
                    "Could not determine a storage directory",
                )
            })?;

        Ok(Self::new(storage_root))
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }
}
