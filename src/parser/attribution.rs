//! Attribution trailer extraction (`Signed-off-by:`, `Reviewed-by:`, ...).

use regex::{Captures, Regex};

use super::unix_newlines;
use crate::model::record::Attribution;

/// Finds `<Word>-by: Name <email>` trailers in arbitrary text.
///
/// Text from the first standalone `-- ` signature line onwards is ignored.
/// Two repair passes run first to undo common mail-client line wrapping:
/// a trailer whose `(...)` was split across two lines, and a trailer whose
/// `<email>` ended up alone on the next line.
#[derive(Debug, Clone)]
pub struct AttributionExtractor {
    signature: Regex,
    paren_join: Regex,
    trailer_start: Regex,
    email_join: Regex,
    trailer: Regex,
}

impl Default for AttributionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributionExtractor {
    pub fn new() -> Self {
        Self {
            signature: Regex::new(r"(?m)^-- $").expect("valid signature pattern"),
            paren_join: Regex::new(
                r"(?m)^([ \t]*[A-Za-z][\w-]*:[^\n]*\([^)\n]*?)[ \t]*\n[ \t]*([^\n]*\))[ \t]*$",
            )
            .expect("valid paren join pattern"),
            trailer_start: Regex::new(r"(?i)^[ \t]*[\w-]+-by:").expect("valid trailer start pattern"),
            email_join: Regex::new(
                r"(?mi)^([ \t]*[\w-]+-by:[^<\n]*?)[ \t]*\n[ \t]*(<[^>\n]+>)[ \t]*$",
            )
            .expect("valid email join pattern"),
            trailer: Regex::new(
                r"(?mi)^[ \t]*(?P<kind>[\w-]+-by):[ \t]*(?P<name>[^<\n]+?)[ \t]*<(?P<email>[^>\n]+)>",
            )
            .expect("valid trailer pattern"),
        }
    }

    /// Extract trailers in order of appearance.
    pub fn extract(&self, text: &str) -> Vec<Attribution> {
        let text = unix_newlines(text);
        let text = match self.signature.find(&text) {
            Some(sig) => &text[..sig.start()],
            None => &text[..],
        };

        // A following trailer line is never the tail of a wrapped parenthesis.
        let text = self.paren_join.replace_all(text, |caps: &Captures| {
            if self.trailer_start.is_match(&caps[2]) {
                caps[0].to_string()
            } else {
                format!("{} {}", &caps[1], &caps[2])
            }
        });
        let text = self.email_join.replace_all(&text, "${1} ${2}");

        self.trailer
            .captures_iter(&text)
            .map(|caps| Attribution {
                kind: caps["kind"].to_string(),
                identification: format!("{} <{}>", caps["name"].trim(), caps["email"].trim()),
            })
            .collect()
    }
}
