//! LogRecord codec
//!
//! Serializes records onto a data file's I/O handle and decodes them back
//! from a given offset.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CaskError, Result};
use crate::fio::IoManager;

use super::{LogRecord, LogRecordType, ReadLogRecord};

/// CRC (4) + Type (1) + KeyLen varint (≤5) + ValLen varint (≤5)
pub const MAX_LOG_RECORD_HEADER_SIZE: usize = CRC_SIZE + TYPE_SIZE + 2 * MAX_VARINT_LEN;

const CRC_SIZE: usize = 4;
const TYPE_SIZE: usize = 1;
const MAX_VARINT_LEN: usize = 5;

/// Largest length whose zig-zag varint still fits in `MAX_VARINT_LEN` bytes
const MAX_FIELD_LEN: u64 = (1 << 34) - 1;

/// Encodes/decodes log records over one data file's I/O handle
pub struct LogRecordCodec {
    io: Box<dyn IoManager>,
}

impl LogRecordCodec {
    pub fn new(io: Box<dyn IoManager>) -> Self {
        Self { io }
    }

    /// Serialize a record into its on-disk bytes (header + key + value)
    pub fn encode(record: &LogRecord) -> Result<Bytes> {
        for len in [record.key.len() as u64, record.value.len() as u64] {
            if len > MAX_FIELD_LEN {
                return Err(CaskError::RecordTooLarge(len));
            }
        }

        let mut buf = BytesMut::with_capacity(Self::encoded_size(record));

        // CRC placeholder, filled once the rest is in place
        buf.put_u32_le(0);
        buf.put_u8(record.rec_type as u8);
        put_varint(&mut buf, record.key.len() as i64);
        put_varint(&mut buf, record.value.len() as i64);
        buf.put_slice(&record.key);
        buf.put_slice(&record.value);

        let crc = crc32fast::hash(&buf[CRC_SIZE..]);
        buf[..CRC_SIZE].copy_from_slice(&crc.to_le_bytes());

        Ok(buf.freeze())
    }

    /// Number of bytes `encode` produces for `record`, without encoding it
    pub fn encoded_size(record: &LogRecord) -> usize {
        CRC_SIZE
            + TYPE_SIZE
            + varint_len(record.key.len() as i64)
            + varint_len(record.value.len() as i64)
            + record.key.len()
            + record.value.len()
    }

    /// Append the encoded record to the file, returning bytes written
    pub fn encode_log_record(&self, record: &LogRecord) -> Result<usize> {
        let encoded = Self::encode(record)?;
        Ok(self.io.write(&encoded)?)
    }

    /// Decode the record starting at `offset`
    ///
    /// Returns:
    /// - `Ok(Some(read))`: the record and the bytes it occupies
    /// - `Ok(None)`: no bytes remain at `offset` (end of stream)
    /// - `Err(CorruptData)`: CRC mismatch
    /// - `Err(DataFileDamaged)`: header or payload runs past end of file
    pub fn decode_log_record(&self, offset: u64) -> Result<Option<ReadLogRecord>> {
        let file_size = self.io.size()?;
        if offset >= file_size {
            return Ok(None);
        }

        // Never ask for more header bytes than the file still holds
        let window = (file_size - offset).min(MAX_LOG_RECORD_HEADER_SIZE as u64) as usize;
        let mut header_buf = [0u8; MAX_LOG_RECORD_HEADER_SIZE];
        let header = &mut header_buf[..window];

        let n = self.io.read(header, offset)?;
        if n < CRC_SIZE + TYPE_SIZE + 2 {
            return Err(truncated(offset, n as u64));
        }
        let header = &header[..n];

        let stored_crc = (&header[..CRC_SIZE]).get_u32_le();
        let type_byte = header[CRC_SIZE];

        let mut pos = CRC_SIZE + TYPE_SIZE;
        let (key_len, used) = read_varint(&header[pos..]).ok_or_else(|| {
            CaskError::DataFileDamaged(format!("bad key length varint at offset {}", offset))
        })?;
        pos += used;
        let (value_len, used) = read_varint(&header[pos..]).ok_or_else(|| {
            CaskError::DataFileDamaged(format!("bad value length varint at offset {}", offset))
        })?;
        pos += used;

        if key_len < 0 || value_len < 0 {
            return Err(CaskError::DataFileDamaged(format!(
                "negative field length at offset {}",
                offset
            )));
        }

        let header_len = pos;
        let (key_len, value_len) = (key_len as u64, value_len as u64);
        let payload_len = key_len + value_len;
        let remaining = file_size - offset;
        if header_len as u64 + payload_len > remaining {
            return Err(truncated(offset, remaining));
        }

        // Key and value are contiguous right after the header
        let mut payload = vec![0u8; payload_len as usize];
        let n = self.io.read(&mut payload, offset + header_len as u64)?;
        if (n as u64) < payload_len {
            return Err(truncated(offset, header_len as u64 + n as u64));
        }

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&header[CRC_SIZE..header_len]);
        hasher.update(&payload);
        if hasher.finalize() != stored_crc {
            return Err(CaskError::CorruptData { offset });
        }

        let rec_type = LogRecordType::from_u8(type_byte).ok_or_else(|| {
            CaskError::DataFileDamaged(format!(
                "unknown record type {} at offset {}",
                type_byte, offset
            ))
        })?;

        let mut key = Bytes::from(payload);
        let value = key.split_off(key_len as usize);

        Ok(Some(ReadLogRecord {
            record: LogRecord {
                key,
                value,
                rec_type,
            },
            size: header_len + payload_len as usize,
        }))
    }

    pub fn sync(&self) -> Result<()> {
        Ok(self.io.sync()?)
    }

    pub fn size(&self) -> Result<u64> {
        Ok(self.io.size()?)
    }

    pub fn truncate(&self, len: u64) -> Result<()> {
        Ok(self.io.truncate(len)?)
    }
}

fn truncated(offset: u64, available: u64) -> CaskError {
    CaskError::DataFileDamaged(format!(
        "record at offset {} is truncated ({} bytes available)",
        offset, available
    ))
}

// =============================================================================
// Zig-zag varints (same byte layout as Go's encoding/binary PutVarint)
// =============================================================================

pub(crate) fn put_varint(buf: &mut BytesMut, x: i64) -> usize {
    let mut ux = zigzag(x);
    let mut written = 1;
    while ux >= 0x80 {
        buf.put_u8(ux as u8 | 0x80);
        ux >>= 7;
        written += 1;
    }
    buf.put_u8(ux as u8);
    written
}

pub(crate) fn varint_len(x: i64) -> usize {
    let mut ux = zigzag(x);
    let mut len = 1;
    while ux >= 0x80 {
        ux >>= 7;
        len += 1;
    }
    len
}

/// Returns the value and bytes consumed, or `None` if `buf` ends mid-varint
/// or the varint is longer than `MAX_VARINT_LEN`
pub(crate) fn read_varint(buf: &[u8]) -> Option<(i64, usize)> {
    let mut ux: u64 = 0;
    for (i, &byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        ux |= u64::from(byte & 0x7f) << (7 * i);
        if byte < 0x80 {
            let x = (ux >> 1) as i64;
            let x = if ux & 1 != 0 { !x } else { x };
            return Some((x, i + 1));
        }
    }
    None
}

fn zigzag(x: i64) -> u64 {
    ((x << 1) ^ (x >> 63)) as u64
}
