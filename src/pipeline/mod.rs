//! Run orchestration.
//!
//! [`process_list`] handles one mailing list from start to finish and knows
//! nothing about how it is scheduled. [`run_sequential`] and [`run_parallel`]
//! are two drivers over it: a plain loop and a worker pool with one list per
//! task. Messages within a list are always processed in order by one thread.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::archive::Archive;
use crate::config::ParseMode;
use crate::corpus::{Corpus, CorpusStore, Quarantine};
use crate::error::{Error, ListFailure};
use crate::model::record::Outcome;
use crate::parser::date::{Clock, DateResolver};
use crate::parser::{normalize_message, Patterns};

/// Everything a list run needs, shared read-only by all workers.
#[derive(Clone)]
pub struct RunContext {
    pub clock: Clock,
    pub patterns: Arc<Patterns>,
    pub mode: ParseMode,
    pub archive: Archive,
    /// Root of the per-list quarantine directories.
    pub output_dir: PathBuf,
    pub store: Arc<dyn CorpusStore>,
    pub date_memo_size: usize,
}

impl RunContext {
    pub fn quarantine(&self, list: &str) -> Quarantine {
        Quarantine::for_list(&self.output_dir, list)
    }
}

/// Per-list outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListReport {
    pub list: String,
    pub new: usize,
    pub skipped: usize,
    pub replaced: usize,
    pub failed: usize,
    /// Source files that could not be read at all.
    pub unreadable: usize,
}

impl ListReport {
    fn new(list: &str) -> Self {
        Self {
            list: list.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::New => self.new += 1,
            Outcome::DuplicateSkip => self.skipped += 1,
            Outcome::DuplicateReplace => self.replaced += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Messages that reached an outcome.
    pub fn processed(&self) -> usize {
        self.new + self.skipped + self.replaced + self.failed
    }
}

/// Result of one list run.
pub type ListResult = std::result::Result<ListReport, ListFailure>;

/// Normalize and reconcile every message of one list.
///
/// The corpus is loaded once, updated in memory, and written once at the end
/// if anything changed. In `redo-failed` mode only the quarantined messages
/// are re-read from the archive, and those that now parse leave the
/// quarantine only after the corpus is saved; otherwise the quarantine is
/// cleared first.
pub fn process_list(ctx: &RunContext, list: &str) -> ListResult {
    let fail = |e: Error| e.for_list(list);
    let quarantine = ctx.quarantine(list);

    let files = match ctx.mode {
        ParseMode::RedoFailed => quarantine.entries().map_err(fail)?,
        ParseMode::SkipKnown | ParseMode::ForceReparse => {
            let files = ctx.archive.message_files(list).map_err(fail)?;
            quarantine.clear().map_err(fail)?;
            files
        }
    };
    info!(list, mode = %ctx.mode, messages = files.len(), "Processing list");

    let mut corpus = Corpus::new(ctx.store.load(list).map_err(fail)?);
    let mut dates = DateResolver::new(&ctx.patterns.dates, ctx.clock, ctx.date_memo_size);
    let mut report = ListReport::new(list);
    // Redo entries leave quarantine only once the corpus holding them is saved.
    let mut recovered: Vec<&str> = Vec::new();

    for name in &files {
        let raw = match ctx.archive.read_message(list, name) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(list, file = %name, error = %e, "Cannot read message, skipping");
                report.unreadable += 1;
                continue;
            }
        };

        match normalize_message(&raw, &ctx.patterns, &mut dates) {
            Ok(message) => {
                let outcome = corpus.reconcile(message.record, ctx.mode).map_err(fail)?;
                debug!(list, file = %name, %outcome, "Message reconciled");
                report.record(outcome);
                if ctx.mode == ParseMode::RedoFailed {
                    recovered.push(name);
                }
            }
            Err(e) => {
                quarantine.store(name, &raw, &e).map_err(fail)?;
                report.record(Outcome::Failed);
            }
        }
    }

    if corpus.is_modified() {
        ctx.store.save(list, corpus.records()).map_err(fail)?;
    } else {
        debug!(list, "Corpus unchanged, not rewritten");
    }

    for name in recovered {
        quarantine.remove(name).map_err(fail)?;
    }

    info!(
        list,
        new = report.new,
        skipped = report.skipped,
        replaced = report.replaced,
        failed = report.failed,
        unreadable = report.unreadable,
        "List done"
    );
    Ok(report)
}

/// Process lists one after another on the calling thread.
pub fn run_sequential(
    ctx: &RunContext,
    lists: &[String],
    progress: &(dyn Fn(usize, usize) + Sync),
) -> Vec<ListResult> {
    let total = lists.len();
    lists
        .iter()
        .enumerate()
        .map(|(i, list)| {
            let result = guarded(ctx, list);
            progress(i + 1, total);
            result
        })
        .collect()
}

/// Process lists on a pool of `parallelism` workers (0 = number of CPUs).
///
/// Results are returned in the order of `lists`. A list that fails or
/// panics does not affect the others.
pub fn run_parallel(
    ctx: &RunContext,
    lists: &[String],
    parallelism: usize,
    progress: &(dyn Fn(usize, usize) + Sync),
) -> crate::error::Result<Vec<ListResult>> {
    let threads = if parallelism == 0 {
        num_cpus::get()
    } else {
        parallelism
    };
    info!(lists = lists.len(), threads, "Starting worker pool");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::ThreadPool(e.to_string()))?;

    let total = lists.len();
    let done = AtomicUsize::new(0);
    let results = pool.install(|| {
        lists
            .par_iter()
            .map(|list| {
                let result = guarded(ctx, list);
                progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
                result
            })
            .collect()
    });
    Ok(results)
}

/// Run one list, turning a panic into a [`ListFailure`].
fn guarded(ctx: &RunContext, list: &str) -> ListResult {
    let result = catch_unwind(AssertUnwindSafe(|| process_list(ctx, list)))
        .unwrap_or_else(|payload| Err(Error::WorkerPanicked(panic_message(&*payload)).for_list(list)));
    if let Err(ref failure) = result {
        error!(list, error = %failure.source, "List failed");
    }
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::FileCorpusStore;
    use crate::error::Result;
    use crate::model::record::ParsedRecord;
    use chrono::NaiveDate;

    fn context(input: &std::path::Path, output: &std::path::Path, mode: ParseMode) -> RunContext {
        let now = NaiveDate::from_ymd_opt(2025, 12, 21)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        RunContext {
            clock: Clock::fixed(now, 3),
            patterns: Arc::new(Patterns::new()),
            mode,
            archive: Archive::new(input),
            output_dir: output.to_path_buf(),
            store: Arc::new(FileCorpusStore::new(output)),
            date_memo_size: 32,
        }
    }

    fn write(dir: &std::path::Path, path: &str, contents: &str) {
        let path = dir.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_report_counts() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "netdev/1", "Message-ID: <1@x>\n\nbody\n");
        write(input.path(), "netdev/2", "Subject: no id\n\nbody\n");
        write(input.path(), "netdev/__last_article_number", "2");

        let ctx = context(input.path(), output.path(), ParseMode::SkipKnown);
        let report = process_list(&ctx, "netdev").unwrap();
        assert_eq!(report.new, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.processed(), 2);
        assert!(output.path().join("netdev/errors/2").exists());
    }

    #[test]
    fn test_missing_list_is_a_list_failure() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let ctx = context(input.path(), output.path(), ParseMode::SkipKnown);
        let failure = process_list(&ctx, "ghost").unwrap_err();
        assert_eq!(failure.list, "ghost");
        assert!(matches!(failure.source, Error::SourceNotFound(_)));
    }

    struct PanickingStore;

    impl CorpusStore for PanickingStore {
        fn load(&self, list: &str) -> Result<Vec<ParsedRecord>> {
            if list == "bad" {
                panic!("store exploded");
            }
            Ok(Vec::new())
        }

        fn save(&self, _list: &str, _records: &[ParsedRecord]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_panicking_list_does_not_affect_others() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "bad/1", "Message-ID: <1@x>\n\nbody\n");
        write(input.path(), "good/1", "Message-ID: <1@x>\n\nbody\n");

        let mut ctx = context(input.path(), output.path(), ParseMode::SkipKnown);
        ctx.store = Arc::new(PanickingStore);
        let lists = vec!["bad".to_string(), "good".to_string()];
        let results = run_parallel(&ctx, &lists, 2, &|_, _| {}).unwrap();

        let failure = results[0].as_ref().unwrap_err();
        assert!(matches!(failure.source, Error::WorkerPanicked(ref m) if m.contains("exploded")));
        assert_eq!(results[1].as_ref().unwrap().new, 1);
    }

    #[test]
    fn test_drivers_agree() {
        let input = tempfile::tempdir().unwrap();
        write(input.path(), "a/1", "Message-ID: <1@x>\n\nbody\n");
        write(input.path(), "b/1", "Message-ID: <2@x>\n\nbody\n");
        let lists = vec!["a".to_string(), "b".to_string()];

        let out_seq = tempfile::tempdir().unwrap();
        let seq = run_sequential(
            &context(input.path(), out_seq.path(), ParseMode::SkipKnown),
            &lists,
            &|_, _| {},
        );
        let out_par = tempfile::tempdir().unwrap();
        let par = run_parallel(
            &context(input.path(), out_par.path(), ParseMode::SkipKnown),
            &lists,
            0,
            &|_, _| {},
        )
        .unwrap();

        let seq: Vec<ListReport> = seq.into_iter().map(|r| r.unwrap()).collect();
        let par: Vec<ListReport> = par.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(seq, par);
    }
}
