//! Raw message reading: split the byte stream at the header/body boundary and
//! decode both halves to text.

use crate::error::MessageError;

/// A message split at its first blank line, headers already decoded.
#[derive(Debug)]
pub struct RawMessage<'a> {
    /// Decoded header block (everything before the first whitespace-only line).
    pub header_text: String,
    /// Undecoded body bytes (everything after that line).
    pub body_bytes: &'a [u8],
}

impl<'a> RawMessage<'a> {
    /// Split raw bytes into header text and body bytes.
    ///
    /// The first line consisting only of whitespace ends the headers and is
    /// itself dropped. Later blank lines belong to the body. A message without
    /// such a line has an empty body.
    pub fn split(raw: &'a [u8]) -> Self {
        let raw = strip_bom(raw);

        let mut pos = 0;
        while pos < raw.len() {
            let next = match raw[pos..].iter().position(|&b| b == b'\n') {
                Some(nl) => pos + nl + 1,
                None => raw.len(),
            };
            if raw[pos..next].iter().all(u8::is_ascii_whitespace) {
                return Self {
                    header_text: decode_header_bytes(&raw[..pos]),
                    body_bytes: &raw[next..],
                };
            }
            pos = next;
        }

        Self {
            header_text: decode_header_bytes(raw),
            body_bytes: &[],
        }
    }

    /// Header lines in order, line terminators removed.
    pub fn header_lines(&self) -> Vec<&str> {
        self.header_text.lines().collect()
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)
}

/// Decode raw header bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
fn decode_header_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Decode body bytes with the charset declared in `Content-Type`.
///
/// - declared and known: decoded, malformed sequences become U+FFFD
/// - not declared: strict UTF-8, else Windows-1252
/// - declared but unknown: [`MessageError::UndecodableBody`]
pub fn decode_body(bytes: &[u8], charset: Option<&str>) -> Result<String, MessageError> {
    match charset {
        None => Ok(match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        }),
        Some(label) => {
            let encoding = encoding_rs::Encoding::for_label(label.trim().as_bytes()).ok_or_else(
                || MessageError::UndecodableBody {
                    charset: label.to_string(),
                },
            )?;
            let (decoded, _, _) = encoding.decode(bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Extract the `charset` parameter from a `Content-Type` value.
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"').trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
