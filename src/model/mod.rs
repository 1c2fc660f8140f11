//! Core data model types: header maps, parsed records and reconciliation outcomes.

pub mod header_map;
pub mod record;
