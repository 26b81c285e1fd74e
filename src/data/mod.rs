//! Data Module
//!
//! Log records, their binary codec, and the append-only data files that hold them.
//!
//! ## Responsibilities
//! - Encode/decode log records with CRC32 checksums
//! - Track the write offset of each data file
//! - Positioned reads for point lookups and startup replay
//!
//! ## Record Format
//! ```text
//! ┌─────────┬──────────┬──────────────┬──────────────┬───────┬─────────┐
//! │ CRC (4) │ Type (1) │ KeyLen (≤5)  │ ValLen (≤5)  │  Key  │  Value  │
//! └─────────┴──────────┴──────────────┴──────────────┴───────┴─────────┘
//!   CRC32 (IEEE, little-endian) covers Type..Value
//!   KeyLen / ValLen are zig-zag varints
//!   Type: 0 = tombstone, 1 = normal value
//! ```
//!
//! ## File Layout
//! ```text
//! {dir_path}/000000001.data   ← immutable
//! {dir_path}/000000002.data   ← immutable
//! {dir_path}/000000003.data   ← active (highest id)
//! ```

mod codec;
mod data_file;
mod log_record;

pub use codec::{LogRecordCodec, MAX_LOG_RECORD_HEADER_SIZE};
pub use data_file::{data_file_path, parse_file_id, DataFile, DATA_FILE_SUFFIX};
pub use log_record::{LogRecord, LogRecordPos, LogRecordType, ReadLogRecord};
