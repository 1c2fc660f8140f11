//! JSON Lines export: one camelCase record object per line.

use std::io::Write;

use crate::model::record::ParsedRecord;

pub fn write_jsonl(records: &[ParsedRecord], out: &mut impl Write) -> anyhow::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::header_map::HeaderMap;

    #[test]
    fn test_one_object_per_line() {
        let mut headers = HeaderMap::new();
        headers.insert("message-id", "<1@x>".into());
        let record = ParsedRecord {
            from: "a@x".into(),
            to: Vec::new(),
            cc: Vec::new(),
            subject: "multi\nline".into(),
            message_id: "<1@x>".into(),
            in_reply_to: String::new(),
            references: vec!["<0@x>".into()],
            mailing_list: String::new(),
            date: None,
            attributions: Vec::new(),
            patches: Vec::new(),
            raw_body: "body\n".into(),
            headers,
        };
        let mut out = Vec::new();
        write_jsonl(&[record.clone(), record], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["messageId"], "<1@x>");
        assert_eq!(value["inReplyTo"], "");
        assert!(value["date"].is_null());
        assert_eq!(value["references"][0], "<0@x>");
    }
}
