//! Message normalization: raw byte split, header segmentation, date
//! resolution, body segmentation, trailer and patch extraction.

use std::borrow::Cow;

pub mod attribution;
pub mod body;
pub mod date;
pub mod header;
pub mod message;
pub mod patch;
pub mod raw;

pub use message::{normalize_message, NormalizedMessage, Patterns};

/// Convert CRLF line endings to LF, borrowing when there is nothing to do.
pub(crate) fn unix_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
