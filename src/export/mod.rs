//! Export of the ParsedRecord stream for downstream consumers: JSON Lines and CSV.

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::record::ParsedRecord;

pub mod csv;
pub mod jsonl;

/// Output format of `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// One JSON object per line, every field included.
    Jsonl,
    /// Summary columns, UTF-8 with BOM.
    Csv,
}

/// Write `records` to `output_path` in the given format.
pub fn export_records(
    records: &[ParsedRecord],
    format: ExportFormat,
    output_path: &Path,
) -> anyhow::Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut out = BufWriter::new(std::fs::File::create(output_path)?);
    match format {
        ExportFormat::Jsonl => jsonl::write_jsonl(records, &mut out)?,
        ExportFormat::Csv => csv::write_csv(records, &mut out)?,
    }
    out.flush()?;
    tracing::info!(path = %output_path.display(), records = records.len(), ?format, "Exported");
    Ok(())
}
