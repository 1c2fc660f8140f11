//! Reconciliation of freshly parsed records against a list's corpus.

use std::collections::HashMap;

use tracing::debug;

use crate::config::ParseMode;
use crate::error::{Error, Result};
use crate::model::record::{Outcome, ParsedRecord};

/// A list's records plus an index of their positions by `Message-ID`.
///
/// The index is rebuilt from the loaded records and kept in step with every
/// mutation; mutations are append or whole-record splice only.
#[derive(Debug, Default)]
pub struct Corpus {
    records: Vec<ParsedRecord>,
    index: HashMap<String, Vec<usize>>,
    modified: bool,
}

impl Corpus {
    pub fn new(records: Vec<ParsedRecord>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            index.entry(record.message_id.clone()).or_default().push(pos);
        }
        Self {
            records,
            index,
            modified: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ParsedRecord] {
        &self.records
    }

    /// Whether any record was appended or replaced since loading.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Positions of the records carrying `message_id`.
    pub fn positions(&self, message_id: &str) -> &[usize] {
        self.index.get(message_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Reconcile one record.
    ///
    /// More than one existing record with the same identity means the corpus
    /// is corrupt and is reported as [`Error::IdentityConflict`].
    pub fn reconcile(&mut self, record: ParsedRecord, mode: ParseMode) -> Result<Outcome> {
        let (count, existing) = {
            let found = self.positions(&record.message_id);
            (found.len(), found.first().copied())
        };
        if count > 1 {
            return Err(Error::IdentityConflict {
                message_id: record.message_id,
                count,
            });
        }

        let outcome = match (existing, mode) {
            (None, _) => Outcome::New,
            (Some(_), ParseMode::ForceReparse) => Outcome::DuplicateReplace,
            (Some(_), ParseMode::SkipKnown | ParseMode::RedoFailed) => Outcome::DuplicateSkip,
        };
        debug!(message_id = %record.message_id, %outcome, "Reconciled");

        match (outcome, existing) {
            (Outcome::New, _) => {
                let pos = self.records.len();
                self.index
                    .entry(record.message_id.clone())
                    .or_default()
                    .push(pos);
                self.records.push(record);
                self.modified = true;
            }
            (Outcome::DuplicateReplace, Some(pos)) => {
                self.records[pos] = record;
                self.modified = true;
            }
            _ => {}
        }
        Ok(outcome)
    }
}
