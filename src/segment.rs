//! Splitting a Markdown body into code and prose segments.
//!
//! Text transforms (caption numbering, heading promotion) must never touch
//! the inside of a code block. [`segments`] walks the body line by line and
//! returns an ordered list of [`Segment`]s, each tagged as code or prose.
//!
//! ## Rules
//!
//! - **Fenced code**: a line whose left-trimmed text starts with 6, 5, 4 or 3
//!   backticks (longest checked first) opens a fence. Only a line carrying
//!   the *same* marker closes it, so a ```` ```` ```` block can contain a
//!   ```` ``` ```` example. Both fence lines belong to the code segment.
//! - **Indented code**: a line starting with four spaces opens a code block
//!   when it starts a paragraph (first line, or the previous line is blank).
//!   The block ends just before the first following non-blank line that does
//!   not start with a space.
//! - **Unterminated fences** stay code to the end of the body. A broken fence
//!   is left alone rather than risk rewriting what is really code.
//!
//! ## Reconstruction
//!
//! Joining every segment's text with `"\n"` reproduces the body exactly.
//! Adjacent segments always differ in kind; two back-to-back code blocks are
//! merged into one code segment.

use tracing::debug;

/// A run of body lines that is either all code or all prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub is_code: bool,
}

impl Segment {
    fn new(text: String, is_code: bool) -> Self {
        Self { text, is_code }
    }
}

const FENCES: [&str; 4] = ["``````", "`````", "````", "```"];
const INDENT: &str = "    ";

/// Fence marker at the start of a (left-trimmed) line, longest first.
fn fence_marker(trimmed: &str) -> Option<&'static str> {
    FENCES.iter().copied().find(|f| trimmed.starts_with(f))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Prose,
    Fenced(&'static str),
    Indented,
}

struct Segmenter {
    segments: Vec<Segment>,
    current: Vec<String>,
}

impl Segmenter {
    fn flush(&mut self, is_code: bool) {
        if self.current.is_empty() {
            return;
        }
        let text = self.current.join("\n");
        self.current.clear();
        match self.segments.last_mut() {
            Some(last) if last.is_code == is_code => {
                last.text.push('\n');
                last.text.push_str(&text);
            }
            _ => self.segments.push(Segment::new(text, is_code)),
        }
    }
}

/// Split `body` into alternating code and prose segments.
pub fn segments(body: &str) -> Vec<Segment> {
    let lines: Vec<&str> = body.split('\n').collect();
    let mut seg = Segmenter {
        segments: Vec::new(),
        current: Vec::new(),
    };
    let mut state = State::Prose;

    for (i, &line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();

        if state == State::Indented && !line.trim().is_empty() && !line.starts_with(' ') {
            seg.flush(true);
            state = State::Prose;
        }

        match state {
            State::Prose => {
                if let Some(marker) = fence_marker(trimmed) {
                    seg.flush(false);
                    debug!(line = i + 1, marker, "code fence opened");
                    state = State::Fenced(marker);
                } else if line.starts_with(INDENT) && (i == 0 || lines[i - 1].trim().is_empty())
                {
                    seg.flush(false);
                    debug!(line = i + 1, "indented code block opened");
                    state = State::Indented;
                }
                seg.current.push(line.to_string());
            }
            State::Fenced(marker) => {
                seg.current.push(line.to_string());
                if fence_marker(trimmed) == Some(marker) {
                    seg.flush(true);
                    state = State::Prose;
                }
            }
            State::Indented => seg.current.push(line.to_string()),
        }
    }

    if let State::Fenced(marker) = state {
        debug!(marker, "code fence never closed, treating rest of body as code");
    }
    seg.flush(state != State::Prose);
    seg.segments
}

/// Apply `transform` to every prose segment and reassemble the body.
///
/// Code segments are passed through verbatim.
pub fn map_prose<F>(body: &str, mut transform: F) -> String
where
    F: FnMut(&str) -> String,
{
    segments(body)
        .into_iter()
        .map(|s| if s.is_code { s.text } else { transform(&s.text) })
        .collect::<Vec<_>>()
        .join("\n")
}
