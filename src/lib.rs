//! # caskdb
//!
//! A log-structured key-value storage engine (Bitcask model) with:
//! - Append-only data files with CRC32-checked records
//! - Automatic data file rotation at a size threshold
//! - Crash recovery by replaying every data file at startup
//! - An ordered, thread-safe in-memory index with snapshot iterators
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Engine                              │
//! │        put / get / delete / fold / list_keys / sync         │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!   ┌─────────────────────────┐      ┌─────────────────────┐
//!   │       Data Files        │      │        Index        │
//!   │ active + immutable (Rw) │      │  key → (fid, off)   │
//!   └────────────┬────────────┘      │      (RwLock)       │
//!                │                   └─────────────────────┘
//!                ▼
//!   ┌─────────────────────────┐
//!   │    LogRecord Codec      │
//!   │  [crc|type|klen|vlen]   │
//!   └────────────┬────────────┘
//!                ▼
//!   ┌─────────────────────────┐
//!   │   File I/O (IoManager)  │
//!   └─────────────────────────┘
//! ```
//!
//! ## Basic Usage
//!
//! ```no_run
//! use caskdb::{Config, Engine};
//!
//! let config = Config::builder().dir_path("/tmp/caskdb-demo").build();
//! let engine = Engine::open(config)?;
//!
//! engine.put(b"hello", b"world")?;
//! assert_eq!(engine.get(b"hello")?.as_ref(), b"world");
//!
//! engine.delete(b"hello")?;
//! engine.close()?;
//! # Ok::<(), caskdb::CaskError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod fio;
pub mod data;
pub mod index;
pub mod engine;
pub mod util;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CaskError, Result};
pub use config::{Config, IndexKind, SyncPolicy};
pub use engine::{Engine, Stat};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of caskdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
