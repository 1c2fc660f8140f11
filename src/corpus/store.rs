//! Persisted corpus storage.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::format;
use crate::error::{Error, Result};
use crate::model::record::ParsedRecord;

/// File name of a list's corpus inside its directory.
pub const CORPUS_FILE_NAME: &str = "corpus.mnc";

/// Whole-table storage for per-list corpora.
///
/// Read once at the start of a list run and written once at its end.
pub trait CorpusStore: Send + Sync {
    /// Load every record of a list; a list never written yet is empty.
    fn load(&self, list: &str) -> Result<Vec<ParsedRecord>>;

    /// Replace the stored records of a list.
    fn save(&self, list: &str, records: &[ParsedRecord]) -> Result<()>;
}

/// Corpus files under `<root>/parsed/list=<name>/corpus.mnc`.
#[derive(Debug, Clone)]
pub struct FileCorpusStore {
    root: PathBuf,
}

impl FileCorpusStore {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            root: output_root.into(),
        }
    }

    pub fn path_for(&self, list: &str) -> PathBuf {
        self.root
            .join("parsed")
            .join(format!("list={list}"))
            .join(CORPUS_FILE_NAME)
    }
}

impl CorpusStore for FileCorpusStore {
    fn load(&self, list: &str) -> Result<Vec<ParsedRecord>> {
        let path = self.path_for(list);
        if !path.exists() {
            debug!(list, "No corpus yet");
            return Ok(Vec::new());
        }
        let data = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
        let records = format::decode(&path, &data)?;
        debug!(list, records = records.len(), "Corpus loaded");
        Ok(records)
    }

    fn save(&self, list: &str, records: &[ParsedRecord]) -> Result<()> {
        let path = self.path_for(list);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let data = format::encode(&path, records)?;

        let tmp = path.with_extension("mnc.tmp");
        write_file(&tmp, &data)?;
        std::fs::rename(&tmp, &path).map_err(|e| Error::io(&path, e))?;
        info!(list, records = records.len(), path = %path.display(), "Corpus written");
        Ok(())
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| Error::io(path, e))?;
    file.write_all(data).map_err(|e| Error::io(path, e))?;
    file.sync_all().map_err(|e| Error::io(path, e))?;
    Ok(())
}
