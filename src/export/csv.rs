//! Export record summaries to CSV.
//!
//! Output is UTF-8 with BOM for Excel compatibility.

use std::io::Write;

use crate::model::record::ParsedRecord;

/// Write one summary row per record.
///
/// Columns: Date, From, To, CC, Subject, Message_ID, In_Reply_To, References,
/// Mailing_List, Attributions, Patches. Multi-valued cells are joined with `"; "`;
/// `Patches` is the number of extracted patches and an unknown date is empty.
pub fn write_csv(records: &[ParsedRecord], out: &mut impl Write) -> anyhow::Result<()> {
    // UTF-8 BOM for Excel
    out.write_all(&[0xEF, 0xBB, 0xBF])?;
    writeln!(
        out,
        "Date,From,To,CC,Subject,Message_ID,In_Reply_To,References,Mailing_List,Attributions,Patches"
    )?;

    for record in records {
        let date = record
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let attributions = record
            .attributions
            .iter()
            .map(|a| format!("{}: {}", a.kind, a.identification))
            .collect::<Vec<_>>()
            .join("; ");

        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{}",
            csv_escape(&date),
            csv_escape(&record.from),
            csv_escape(&record.to.join("; ")),
            csv_escape(&record.cc.join("; ")),
            csv_escape(&record.subject),
            csv_escape(&record.message_id),
            csv_escape(&record.in_reply_to),
            csv_escape(&record.references.join(" ")),
            csv_escape(&record.mailing_list),
            csv_escape(&attributions),
            record.patches.len(),
        )?;
    }

    Ok(())
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::header_map::HeaderMap;
    use crate::model::record::Attribution;

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("hello"), "hello");
        assert_eq!(csv_escape("hello, world"), "\"hello, world\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_rows() {
        let record = ParsedRecord {
            from: "Dev, Jane <jane@x>".into(),
            to: vec!["a@x".into(), "b@x".into()],
            cc: Vec::new(),
            subject: "[PATCH] fix".into(),
            message_id: "<1@x>".into(),
            in_reply_to: String::new(),
            references: Vec::new(),
            mailing_list: "netdev".into(),
            date: None,
            attributions: vec![Attribution {
                kind: "Signed-off-by".into(),
                identification: "Jane <jane@x>".into(),
            }],
            patches: vec!["---".into()],
            raw_body: String::new(),
            headers: HeaderMap::new(),
        };
        let mut out = Vec::new();
        write_csv(&[record], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.trim_start_matches('\u{feff}').lines();
        assert!(lines.next().unwrap().starts_with("Date,From,To"));
        assert_eq!(
            lines.next().unwrap(),
            ",\"Dev, Jane <jane@x>\",a@x; b@x,,[PATCH] fix,<1@x>,,,netdev,Signed-off-by: Jane <jane@x>,1"
        );
    }
}
