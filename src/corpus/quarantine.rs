//! Quarantine of messages that failed normalization.
//!
//! One file per failed message, named after its source file, holding the
//! original bytes followed by a separator line and the failure text.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Separator written between the original bytes and the failure description.
pub const SEPARATOR: &str = "\n============================== Exception:\n";

/// Per-list quarantine directory, `<output>/<list>/errors/`.
#[derive(Debug, Clone)]
pub struct Quarantine {
    dir: PathBuf,
}

impl Quarantine {
    pub fn for_list(output_root: &Path, list: &str) -> Self {
        Self {
            dir: output_root.join(list).join("errors"),
        }
    }

    /// Remove every quarantined entry. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let names = self.entries()?;
        for name in &names {
            let path = self.dir.join(name);
            std::fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
        if !names.is_empty() {
            debug!(dir = %self.dir.display(), removed = names.len(), "Quarantine cleared");
        }
        Ok(names.len())
    }

    /// Persist a failed message with its failure description.
    pub fn store(&self, name: &str, original: &[u8], error: &impl Display) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let path = self.dir.join(name);
        std::fs::write(&path, entry_contents(original, error)).map_err(|e| Error::io(&path, e))?;
        warn!(file = %name, error = %error, "Message quarantined");
        Ok(())
    }

    /// Remove one entry. Returns `false` if it was not quarantined.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dir.join(name).is_file()
    }

    /// Names of all quarantined entries, sorted. A missing directory is empty.
    pub fn entries(&self) -> Result<Vec<String>> {
        let read = match std::fs::read_dir(&self.dir) {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| Error::io(&self.dir, e))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Bytes of a quarantine entry: original, separator, failure text.
pub fn entry_contents(original: &[u8], error: &impl Display) -> Vec<u8> {
    let mut data = Vec::with_capacity(original.len() + SEPARATOR.len() + 64);
    data.extend_from_slice(original);
    data.extend_from_slice(SEPARATOR.as_bytes());
    data.extend_from_slice(error.to_string().as_bytes());
    data
}
