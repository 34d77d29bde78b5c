//! Server-Sent Events framing.
//!
//! Splits decoded text into blank-line-delimited frames. Framing must run
//! over the cumulative buffer, never per chunk in isolation, so a delimiter
//! straddling a chunk boundary still produces one frame.

/// Incremental SSE framer.
///
/// Buffers partial data and emits complete frames.
#[derive(Debug, Default)]
pub struct SseFramer {
    buffer: String,
}

impl SseFramer {
    /// Create a new framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text and return every complete frame.
    ///
    /// Frames are delimited by double newlines (`\n\n`). Emitted frames are
    /// trimmed; frames that are empty after trimming are dropped. The final
    /// (possibly incomplete) segment stays buffered for the next push.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);
        let mut frames = Vec::new();

        while let Some(pos) = self.buffer.find("\n\n") {
            let frame = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..pos + 2);
            if !frame.is_empty() {
                frames.push(frame);
            }
        }

        frames
    }

    /// Check if there is pending data in the buffer.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }
}
