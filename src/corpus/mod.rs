//! Per-list corpus: persisted format and store, reconciliation, quarantine
//! and read-only queries.

pub mod format;
pub mod quarantine;
pub mod query;
pub mod reconcile;
pub mod store;

pub use quarantine::Quarantine;
pub use reconcile::Corpus;
pub use store::{CorpusStore, FileCorpusStore};
