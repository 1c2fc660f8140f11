//! `mailnorm`: mailing-list message normalization.
//!
//! This crate turns per-list archives of raw RFC 5322 messages into
//! per-list corpora of normalized records: unfolded headers, a resolved
//! canonical date, attribution trailers and inline patches. Messages are
//! reconciled by `Message-ID` against the existing corpus; failures are
//! quarantined next to it.

pub mod archive;
pub mod config;
pub mod corpus;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod pipeline;
