//! Assembly of a [`ParsedRecord`] from one raw message.

use serde::Serialize;
use tracing::{trace, warn};

use super::attribution::AttributionExtractor;
use super::body::{BodySegmenter, BodySegments};
use super::date::{DatePatterns, DateResolver};
use super::header::segment_headers;
use super::patch::PatchExtractor;
use super::raw::{charset_from_content_type, decode_body, RawMessage};
use crate::error::MessageError;
use crate::model::header_map::HeaderMap;
use crate::model::record::ParsedRecord;

/// Every precompiled pattern used during normalization.
///
/// Built once at startup and shared (behind an `Arc`) by all workers.
#[derive(Debug, Clone, Default)]
pub struct Patterns {
    pub dates: DatePatterns,
    pub body: BodySegmenter,
    pub attributions: AttributionExtractor,
    pub patches: PatchExtractor,
}

impl Patterns {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A normalized record together with the body segments that fed it.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedMessage {
    pub record: ParsedRecord,
    pub segments: BodySegments,
}

/// Normalize one raw message.
///
/// Fails only for messages that cannot become a corpus entry: malformed
/// headers or a missing `Message-ID`. An undecodable body is logged and
/// recorded as empty so header metadata is kept.
pub fn normalize_message(
    raw: &[u8],
    patterns: &Patterns,
    dates: &mut DateResolver<'_>,
) -> Result<NormalizedMessage, MessageError> {
    let raw = RawMessage::split(raw);
    let headers = segment_headers(&raw.header_lines())?;

    let message_id = headers
        .first("message-id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(MessageError::MissingIdentity)?
        .to_string();

    let charset = headers
        .first("content-type")
        .and_then(charset_from_content_type);
    let raw_body = match decode_body(raw.body_bytes, charset.as_deref()) {
        Ok(body) => body,
        Err(e) => {
            warn!(message_id = %message_id, error = %e, "Recording empty body");
            String::new()
        }
    };

    let segments = patterns.body.segment(&raw_body);
    let attributions = patterns.attributions.extract(&raw_body);
    let patches = patterns.patches.extract(&raw_body);
    let date = dates.resolve(&headers);

    trace!(
        message_id = %message_id,
        attributions = attributions.len(),
        patches = patches.len(),
        has_date = date.is_some(),
        "Normalized message"
    );

    let record = ParsedRecord {
        from: single(&headers, "from"),
        to: address_field(&headers, "to"),
        cc: address_field(&headers, "cc"),
        subject: single(&headers, "subject"),
        in_reply_to: single(&headers, "in-reply-to"),
        references: headers
            .all("references")
            .into_iter()
            .flat_map(str::split_whitespace)
            .map(str::to_string)
            .collect(),
        mailing_list: headers
            .first("x-mailing-list")
            .or_else(|| headers.first("list-id"))
            .unwrap_or_default()
            .to_string(),
        message_id,
        date,
        attributions,
        patches,
        raw_body,
        headers,
    };

    Ok(NormalizedMessage { record, segments })
}

fn single(headers: &HeaderMap, name: &str) -> String {
    headers.first(name).unwrap_or_default().to_string()
}

fn address_field(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .all(name)
        .into_iter()
        .flat_map(split_address_list)
        .collect()
}

/// Split an address header on commas outside quotes and angle brackets.
///
/// Entries are trimmed and empty ones dropped; display names are kept as written.
pub fn split_address_list(raw: &str) -> Vec<String> {
    let mut results = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_angle = false;

    for ch in raw.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => in_angle = true,
            '>' if !in_quotes => in_angle = false,
            ',' if !in_quotes && !in_angle => {
                push_trimmed(&mut results, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    push_trimmed(&mut results, &current);

    results
}

fn push_trimmed(results: &mut Vec<String>, entry: &str) {
    let entry = entry.trim();
    if !entry.is_empty() {
        results.push(entry.to_string());
    }
}
