//! Binary corpus file format.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ HEADER (128 bytes, fixed)            │
//! │  magic: [u8; 8] = b"MAILNRM\0"      │
//! │  version: u32                        │
//! │  flags: u32                          │
//! │  record_count: u64                   │
//! │  entries_sha256: [u8; 32]            │
//! │  (padding to 128 bytes)              │
//! ├──────────────────────────────────────┤
//! │ ENTRIES (variable)                   │
//! │  bincode-serialized Vec<ParsedRecord>│
//! └──────────────────────────────────────┘
//! ```
//!
//! The header carries no timestamps: encoding the same records twice yields
//! identical bytes.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::model::record::ParsedRecord;

/// Magic bytes identifying a mailnorm corpus file.
pub const MAGIC: &[u8; 8] = b"MAILNRM\0";

/// Current corpus format version.
pub const VERSION: u32 = 1;

/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 128;

/// Serializable corpus header.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CorpusHeader {
    /// Magic bytes (must equal [`MAGIC`]).
    pub magic: [u8; 8],
    /// Format version (must equal [`VERSION`]).
    pub version: u32,
    /// Reserved flags (currently unused).
    pub flags: u32,
    /// Number of records in the corpus.
    pub record_count: u64,
    /// SHA-256 of the entry bytes.
    pub entries_sha256: [u8; 32],
}

impl CorpusHeader {
    /// Validate that the header is well-formed and matches the current format.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.magic != *MAGIC {
            return Err("Invalid magic bytes".into());
        }
        if self.version != VERSION {
            return Err(format!(
                "Incompatible version: expected {VERSION}, found {}",
                self.version
            ));
        }
        Ok(())
    }
}

fn invalid(path: &Path, reason: impl Into<String>) -> Error {
    Error::InvalidCorpus {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Encode records into header + entries bytes.
pub fn encode(path: &Path, records: &[ParsedRecord]) -> Result<Vec<u8>> {
    let entries_bytes = bincode::serialize(records)
        .map_err(|e| invalid(path, format!("Entry serialization failed: {e}")))?;

    let header = CorpusHeader {
        magic: *MAGIC,
        version: VERSION,
        flags: 0,
        record_count: records.len() as u64,
        entries_sha256: Sha256::digest(&entries_bytes).into(),
    };
    let header_bytes = bincode::serialize(&header)
        .map_err(|e| invalid(path, format!("Header serialization failed: {e}")))?;

    // Pad header to HEADER_SIZE
    let mut data = vec![0u8; HEADER_SIZE];
    let copy_len = header_bytes.len().min(HEADER_SIZE);
    data[..copy_len].copy_from_slice(&header_bytes[..copy_len]);
    data.extend_from_slice(&entries_bytes);
    Ok(data)
}

/// Decode and verify a corpus file's contents.
pub fn decode(path: &Path, data: &[u8]) -> Result<Vec<ParsedRecord>> {
    if data.len() < HEADER_SIZE {
        return Err(invalid(path, "File too small"));
    }

    let header: CorpusHeader = bincode::deserialize(&data[..HEADER_SIZE])
        .map_err(|e| invalid(path, format!("Header deserialization failed: {e}")))?;
    header.validate().map_err(|reason| invalid(path, reason))?;

    let entries_bytes = &data[HEADER_SIZE..];
    let digest: [u8; 32] = Sha256::digest(entries_bytes).into();
    if digest != header.entries_sha256 {
        return Err(invalid(path, "Checksum mismatch"));
    }

    let records: Vec<ParsedRecord> = bincode::deserialize(entries_bytes)
        .map_err(|e| invalid(path, format!("Entry deserialization failed: {e}")))?;

    if records.len() as u64 != header.record_count {
        return Err(invalid(
            path,
            format!(
                "Record count mismatch: header says {}, found {}",
                header.record_count,
                records.len()
            ),
        ));
    }

    Ok(records)
}
