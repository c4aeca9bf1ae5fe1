//! The synchronous per-chunk decoding step.

use crate::error::TransportError;
use crate::line::LineBuffer;
use crate::record::{Record, extract_fragment, upstream_error};
use crate::utf8::Utf8Decoder;

/// Tuning for a [`ChatStreamDecoder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// How many further decoding steps a data line that fails to parse may be
    /// retried before it is discarded.
    ///
    /// `None` keeps pushing the line back until the stream ends, which stalls
    /// every record queued behind it. `Some(0)` discards a malformed line on
    /// its first failure.
    pub max_line_retries: Option<u32>,
}

impl DecoderConfig {
    /// Cap the number of retries for a line that fails to parse.
    #[must_use]
    pub fn max_line_retries(mut self, retries: u32) -> Self {
        self.max_line_retries = Some(retries);
        self
    }
}

/// Live state of a decoder.
///
/// `Exhausted` and `Failed` are terminal outcomes reached by consuming the
/// decoder with [`ChatStreamDecoder::finish`] or [`ChatStreamDecoder::fail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No chunk has been fed yet.
    Idle,
    /// At least one chunk has been fed and no terminator seen.
    Streaming,
    /// The terminator sentinel was observed; further input is ignored.
    Completed,
}

/// Terminal state of one decoding session.
#[derive(Debug)]
pub enum StreamOutcome {
    /// The `[DONE]` terminator was observed.
    Completed,
    /// The transport ended without a terminator.
    Exhausted,
    /// The transport failed while reading.
    Failed(TransportError),
}

impl StreamOutcome {
    /// Short lowercase label, used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            StreamOutcome::Completed => "completed",
            StreamOutcome::Exhausted => "exhausted",
            StreamOutcome::Failed(_) => "failed",
        }
    }
}

/// Result of consuming a decoder.
#[derive(Debug)]
pub struct Finish {
    /// Updates produced while flushing the remaining buffer, in order.
    pub updates: Vec<String>,
    /// How the session ended.
    pub outcome: StreamOutcome,
    /// The final assembled message.
    pub message: String,
}

/// A line that failed to parse and was pushed back.
struct StalledLine {
    line: String,
    failures: u32,
}

enum LineAction {
    Continue,
    Done,
    Malformed,
}

/// Decodes an SSE chat completion body one chunk at a time.
///
/// Owns the line buffer and the assembled message for exactly one streaming
/// request. Each call to [`feed`](Self::feed) returns the cumulative message
/// after every fragment it appended, so each returned string extends the one
/// before it.
pub struct ChatStreamDecoder {
    config: DecoderConfig,
    state: DecoderState,
    utf8: Utf8Decoder,
    lines: LineBuffer,
    assembled: String,
    stalled: Option<StalledLine>,
}

impl ChatStreamDecoder {
    /// Create a decoder in the `Idle` state.
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            state: DecoderState::Idle,
            utf8: Utf8Decoder::new(),
            lines: LineBuffer::new(),
            assembled: String::new(),
            stalled: None,
        }
    }

    /// Current live state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Whether the terminator has been observed.
    pub fn is_completed(&self) -> bool {
        self.state == DecoderState::Completed
    }

    /// The message assembled so far.
    pub fn assembled(&self) -> &str {
        &self.assembled
    }

    /// Run one decoding step over a freshly received chunk.
    ///
    /// Returns one cumulative update per non-empty fragment, in arrival order.
    /// Once the terminator has been seen every further chunk is ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.is_completed() {
            return Vec::new();
        }
        self.state = DecoderState::Streaming;

        let text = self.utf8.decode(chunk);
        self.lines.push_str(&text);

        let mut updates = Vec::new();
        while let Some(line) = self.lines.next_line() {
            match self.process_line(&line, &mut updates) {
                LineAction::Continue => {}
                LineAction::Done => {
                    self.complete();
                    break;
                }
                LineAction::Malformed => {
                    if self.retries_exhausted(&line) {
                        tracing::warn!(
                            line_len = line.len(),
                            "discarding data record that never parsed"
                        );
                        continue;
                    }
                    self.lines.push_front_line(&line);
                    break;
                }
            }
        }

        tracing::trace!(
            chunk_len = chunk.len(),
            updates = updates.len(),
            pending = self.lines.pending().len(),
            "decoded chunk"
        );
        updates
    }

    /// Finish the session because the transport has no more data.
    ///
    /// Everything still buffered is processed line by line, including a final
    /// line without a terminator. Lines that do not parse can no longer be
    /// completed and are dropped. The outcome is `Completed` if the
    /// terminator was seen (before or during this flush), otherwise
    /// `Exhausted`.
    pub fn finish(mut self) -> Finish {
        let mut updates = Vec::new();

        if !self.is_completed() {
            let tail = self.utf8.finish();
            self.lines.push_str(&tail);
            let remaining = self.lines.take_remaining();

            for raw in remaining.split('\n') {
                let line = raw.strip_suffix('\r').unwrap_or(raw);
                match self.process_line(line, &mut updates) {
                    LineAction::Continue => {}
                    LineAction::Done => {
                        self.complete();
                        break;
                    }
                    LineAction::Malformed => {
                        tracing::debug!(
                            line_len = line.len(),
                            "dropping incomplete data record at end of stream"
                        );
                    }
                }
            }
        }

        let outcome = if self.is_completed() {
            StreamOutcome::Completed
        } else {
            StreamOutcome::Exhausted
        };
        Finish {
            updates,
            outcome,
            message: self.assembled,
        }
    }

    /// Finish the session because the transport failed.
    ///
    /// Buffered input is not processed; the message assembled so far is kept.
    pub fn fail(self, error: TransportError) -> Finish {
        Finish {
            updates: Vec::new(),
            outcome: StreamOutcome::Failed(error),
            message: self.assembled,
        }
    }

    fn complete(&mut self) {
        self.state = DecoderState::Completed;
        self.lines.take_remaining();
        self.stalled = None;
    }

    fn process_line(&mut self, line: &str, updates: &mut Vec<String>) -> LineAction {
        let payload = match Record::classify(line) {
            Record::Blank | Record::Comment | Record::Ignored => return LineAction::Continue,
            Record::Done => return LineAction::Done,
            Record::Data(payload) => payload,
        };

        let json: serde_json::Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::trace!(error = %e, "data record did not parse, awaiting more input");
                return LineAction::Malformed;
            }
        };
        self.stalled = None;

        if let Some(message) = upstream_error(&json) {
            tracing::warn!(error = %message, "gateway reported an error mid-stream");
            return LineAction::Continue;
        }

        if let Some(fragment) = extract_fragment(&json) {
            self.assembled.push_str(fragment);
            updates.push(self.assembled.clone());
        }
        LineAction::Continue
    }

    /// Record one more failure of `line` and report whether it should now be dropped.
    fn retries_exhausted(&mut self, line: &str) -> bool {
        let failures = match &mut self.stalled {
            Some(stalled) if stalled.line == line => {
                stalled.failures += 1;
                stalled.failures
            }
            _ => {
                self.stalled = Some(StalledLine {
                    line: line.to_string(),
                    failures: 1,
                });
                1
            }
        };

        match self.config.max_line_retries {
            Some(max) if failures > max => {
                self.stalled = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for ChatStreamDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}
