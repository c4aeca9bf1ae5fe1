//! Classification of individual SSE lines and payload field extraction.
//!
//! The gateway speaks the OpenAI-compatible chat completions stream format:
//!
//! ```text
//! : keep-alive comment
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//!
//! data: {"choices":[{"delta":{"content":"lo"}}]}
//!
//! data: [DONE]
//! ```

/// Prefix that marks a data record.
pub const DATA_PREFIX: &str = "data: ";

/// Payload of the record that ends the stream normally.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Leading character of an SSE comment line.
pub const COMMENT_MARKER: char = ':';

/// One extracted line, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// Empty or whitespace-only line.
    Blank,
    /// Line starting with [`COMMENT_MARKER`].
    Comment,
    /// Any other line without the data prefix (`event:`, `id:`, `retry:`, ...).
    Ignored,
    /// The terminator sentinel.
    Done,
    /// Data payload with the prefix stripped and surrounding whitespace trimmed.
    Data(&'a str),
}

impl<'a> Record<'a> {
    /// Classify one line (already stripped of its line terminator).
    pub fn classify(line: &'a str) -> Self {
        if line.trim().is_empty() {
            return Record::Blank;
        }
        if line.starts_with(COMMENT_MARKER) {
            return Record::Comment;
        }
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return Record::Ignored;
        };
        let payload = payload.trim();
        if payload == DONE_SENTINEL {
            Record::Done
        } else {
            Record::Data(payload)
        }
    }
}

/// Extract the incremental text fragment at `choices[0].delta.content`.
///
/// Returns `None` when the path is absent, not a string, or empty.
pub fn extract_fragment(json: &serde_json::Value) -> Option<&str> {
    json["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|content| !content.is_empty())
}

/// Extract the message of an in-band `{"error": {...}}` record, if any.
pub fn upstream_error(json: &serde_json::Value) -> Option<&str> {
    let error = json.get("error")?;
    Some(
        error["message"]
            .as_str()
            .or_else(|| error.as_str())
            .unwrap_or("unknown streaming error"),
    )
}
