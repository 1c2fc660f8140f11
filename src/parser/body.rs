//! Body segmentation around the attribution trailer block.

use regex::Regex;
use serde::Serialize;

/// The three narrative regions of a message body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BodySegments {
    /// Lines before the first trailer line.
    pub before: String,
    /// The contiguous run of trailer lines.
    pub trailers: String,
    /// Everything after the trailer run.
    pub after: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeSigned,
    SignedBlock,
    AfterSigned,
}

/// Splits a body into before / trailers / after with a three-state scanner.
///
/// The scanner never returns to the first state: only the first trailer run
/// is treated as the trailer block.
#[derive(Debug, Clone)]
pub struct BodySegmenter {
    trailer_line: Regex,
}

impl Default for BodySegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl BodySegmenter {
    pub fn new() -> Self {
        Self {
            trailer_line: Regex::new(r"(?i)^\S+-By: [\S\s]* <\S+@\S+>")
                .expect("valid trailer pattern"),
        }
    }

    /// Whether `line` has the `<Token>-By: <name> <<email>>` shape.
    pub fn is_trailer_line(&self, line: &str) -> bool {
        self.trailer_line.is_match(line)
    }

    pub fn segment(&self, body: &str) -> BodySegments {
        let mut segments = BodySegments::default();
        let mut state = State::BeforeSigned;

        for line in body.lines() {
            let is_trailer = self.is_trailer_line(line);
            state = match (state, is_trailer) {
                (State::BeforeSigned, false) => State::BeforeSigned,
                (State::BeforeSigned, true) | (State::SignedBlock, true) => State::SignedBlock,
                (State::SignedBlock, false) | (State::AfterSigned, _) => State::AfterSigned,
            };

            let buffer = match state {
                State::BeforeSigned => &mut segments.before,
                State::SignedBlock => &mut segments.trailers,
                State::AfterSigned => &mut segments.after,
            };
            buffer.push_str(line);
            buffer.push('\n');
        }

        segments
    }
}
