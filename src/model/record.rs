//! The normalized record produced for every successfully parsed message.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::header_map::HeaderMap;

/// One personal attribution trailer, e.g. `Reviewed-by: Name <mail>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    /// Trailer kind as written, e.g. `"Signed-off-by"`.
    pub kind: String,
    /// Always `"<name> <<email>>"`, rebuilt from the trimmed parts.
    pub identification: String,
}

/// A normalized mailing-list message.
///
/// `message_id` is never empty: a message without one is a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecord {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub message_id: String,
    pub in_reply_to: String,
    pub references: Vec<String>,
    pub mailing_list: String,

    /// Resolved naive timestamp; `None` means unknown, never a zero date.
    pub date: Option<NaiveDateTime>,

    /// Trailers in order of appearance in the body.
    pub attributions: Vec<Attribution>,

    /// Extracted diff blocks in order of appearance.
    pub patches: Vec<String>,

    /// The full decoded body, unmodified.
    pub raw_body: String,

    /// Every header observed, as segmented.
    pub headers: HeaderMap,
}

/// What reconciliation did with one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// First time this identity was seen; the record was appended.
    New,
    /// Identity already present; the corpus was left untouched.
    DuplicateSkip,
    /// Identity already present; the record replaced the old one in place.
    DuplicateReplace,
    /// Normalization failed; the message went to quarantine.
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::New => "new",
            Self::DuplicateSkip => "duplicate-skip",
            Self::DuplicateReplace => "duplicate-replace",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}
