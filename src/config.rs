//! Configuration for caskdb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{CaskError, Result};

/// Main configuration for a caskdb instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the data files
    /// Internal structure:
    ///   {dir_path}/
    ///     ├── 000000001.data
    ///     ├── 000000002.data
    ///     └── ...
    pub dir_path: PathBuf,

    /// Size threshold (in bytes) at which the active data file is rotated
    pub max_file_size: u64,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the active data file
    pub sync_policy: SyncPolicy,

    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// Which in-memory index structure backs key lookups
    pub index_kind: IndexKind,
}

/// Data file sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// fsync after every write (safest, slowest)
    Always,

    /// fsync after N uncommitted writes (balanced durability/performance)
    EveryNWrites { count: usize },

    /// fsync only on file rotation, `Engine::sync` and `Engine::close`
    Manual,
}

/// In-memory index implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    /// Ordered tree index (supports ordered iteration and seek)
    #[default]
    BTree,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir_path: std::env::temp_dir().join("caskdb"),
            max_file_size: 256 * 1024 * 1024, // 256 MB
            sync_policy: SyncPolicy::Always,
            index_kind: IndexKind::BTree,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the options `Engine::open` cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.dir_path.as_os_str().is_empty() {
            return Err(CaskError::Config("data directory path is empty".to_string()));
        }

        if self.max_file_size == 0 {
            return Err(CaskError::Config(
                "max file size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn dir_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dir_path = path.into();
        self
    }

    /// Set the data file rotation threshold (in bytes)
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// Set the sync strategy
    pub fn sync_policy(mut self, policy: SyncPolicy) -> Self {
        self.config.sync_policy = policy;
        self
    }

    /// Set the index implementation
    pub fn index_kind(mut self, kind: IndexKind) -> Self {
        self.config.index_kind = kind;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
