//! Corpus querying utilities.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::archive::Archive;
use crate::corpus::Quarantine;
use crate::error::Result;
use crate::model::record::ParsedRecord;

/// Summary statistics of one list's corpus.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub records: usize,
    pub oldest: Option<NaiveDateTime>,
    pub newest: Option<NaiveDateTime>,
    pub undated: usize,
    pub with_patches: usize,
    pub top_senders: Vec<(String, usize)>,
    pub attribution_kinds: Vec<(String, usize)>,
}

/// Source messages of a list set against what the run made of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coverage {
    /// Message files in the archive, bookkeeping excluded.
    pub source_messages: usize,
    pub records: usize,
    pub quarantined: usize,
    /// Source messages neither in the corpus nor in quarantine.
    pub missing: usize,
}

/// Compare a list's archive with its corpus and quarantine.
pub fn coverage(
    archive: &Archive,
    quarantine: &Quarantine,
    list: &str,
    records: usize,
) -> Result<Coverage> {
    let source_messages = archive.message_files(list)?.len();
    let quarantined = quarantine.entries()?.len();
    Ok(Coverage {
        source_messages,
        records,
        quarantined,
        missing: source_messages.saturating_sub(records + quarantined),
    })
}

/// Compute statistics, keeping the `top_n` senders and attribution kinds.
pub fn stats(records: &[ParsedRecord], top_n: usize) -> CorpusStats {
    let range = date_range(records);
    CorpusStats {
        records: records.len(),
        oldest: range.map(|(min, _)| min),
        newest: range.map(|(_, max)| max),
        undated: records.iter().filter(|r| r.date.is_none()).count(),
        with_patches: count_with_patches(records),
        top_senders: top_senders(records, top_n),
        attribution_kinds: attribution_kinds(records, top_n),
    }
}

/// Return the date range (oldest, newest) across the resolved dates.
pub fn date_range(records: &[ParsedRecord]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut dates = records.iter().filter_map(|r| r.date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
}

/// Count how many records carry at least one patch.
pub fn count_with_patches(records: &[ParsedRecord]) -> usize {
    records.iter().filter(|r| !r.patches.is_empty()).count()
}

/// Return the top N senders by message count.
pub fn top_senders(records: &[ParsedRecord], n: usize) -> Vec<(String, usize)> {
    ranked(records.iter().map(|r| r.from.as_str()), n)
}

/// Return the top N attribution kinds (case-folded) by occurrence.
pub fn attribution_kinds(records: &[ParsedRecord], n: usize) -> Vec<(String, usize)> {
    let kinds: Vec<String> = records
        .iter()
        .flat_map(|r| r.attributions.iter())
        .map(|a| a.kind.to_ascii_lowercase())
        .collect();
    ranked(kinds.iter().map(String::as_str), n)
}

fn ranked<'a>(keys: impl Iterator<Item = &'a str>, n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys.filter(|k| !k.is_empty()) {
        *counts.entry(key).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, c)| (k.to_string(), c))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(n);
    sorted
}
