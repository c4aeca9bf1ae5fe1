//! Line reassembly over decoded text.

/// Accumulates decoded text and hands out complete lines.
///
/// After every extraction pass the buffer holds at most the tail of input that
/// has not yet been terminated by `\n`, plus any line pushed back with
/// [`LineBuffer::push_front_line`].
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: String,
}

impl LineBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append decoded text.
    pub fn push_str(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Remove and return the first complete line, without its terminator.
    ///
    /// A single `\r` before the `\n` is stripped as well. Returns `None` when
    /// no `\n` is buffered.
    pub fn next_line(&mut self) -> Option<String> {
        let newline_pos = self.buf.find('\n')?;
        let mut line: String = self.buf.drain(..=newline_pos).collect();
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
        Some(line)
    }

    /// Put a previously extracted line back at the front, with its `\n`.
    pub fn push_front_line(&mut self, line: &str) {
        let mut restored = String::with_capacity(line.len() + 1 + self.buf.len());
        restored.push_str(line);
        restored.push('\n');
        restored.push_str(&self.buf);
        self.buf = restored;
    }

    /// Text not yet resolved into a line.
    pub fn pending(&self) -> &str {
        &self.buf
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take everything that is buffered, leaving the buffer empty.
    pub fn take_remaining(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}
