//! Header segmentation: folded RFC 5322 header lines into a [`HeaderMap`].

use crate::error::MessageError;
use crate::model::header_map::HeaderMap;

/// Build a [`HeaderMap`] from the raw lines preceding the first blank line.
///
/// A line that contains `:` and does not start with a space or tab opens a new
/// field (`name: value`, name lower-cased, both sides trimmed). Every other line
/// is a continuation and is appended, space-joined, to the value of the most
/// recently opened field. A continuation before any field is an error.
pub fn segment_headers<S: AsRef<str>>(lines: &[S]) -> Result<HeaderMap, MessageError> {
    let mut headers = HeaderMap::new();
    let mut current: Option<String> = None;

    for line in lines {
        let line = line.as_ref();
        let starts_field = !line.starts_with([' ', '\t']);

        match line.split_once(':') {
            Some((name, value)) if starts_field => {
                let name = name.trim().to_lowercase();
                headers.insert(&name, value.trim().to_string());
                current = Some(name);
            }
            _ => {
                let Some(name) = current.as_deref() else {
                    return Err(MessageError::MalformedHeader {
                        line: line.to_string(),
                    });
                };
                headers.continue_field(name, line.trim());
            }
        }
    }

    Ok(headers)
}
