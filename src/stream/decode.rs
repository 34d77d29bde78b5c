//! Streaming UTF-8 decoder.
//!
//! Network chunks can split a multi-byte codepoint anywhere; decoding each
//! chunk independently would emit replacement characters at the seam. The
//! decoder holds back a trailing incomplete sequence and prefixes it onto
//! the next chunk instead.

/// Incremental UTF-8 decoder with a carry buffer for split codepoints.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning all text that is complete so far.
    ///
    /// A trailing incomplete sequence stays in the carry buffer. Byte
    /// sequences that can never become valid decode to U+FFFD immediately.
    pub fn feed(&mut self, chunk: &[u8]) -> String {
        self.carry.extend_from_slice(chunk);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.carry) {
                Ok(text) => {
                    out.push_str(text);
                    self.carry.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.carry[..valid]));
                    match err.error_len() {
                        // Invalid bytes: replace and keep decoding the rest.
                        Some(len) => {
                            out.push('\u{FFFD}');
                            self.carry.drain(..valid + len);
                        }
                        // Incomplete trailing sequence: hold it back.
                        None => {
                            self.carry.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flush the carry at end of stream.
    ///
    /// No further bytes can arrive, so whatever is held back decodes
    /// lossily.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        rest
    }

    /// Whether bytes are being held back.
    pub fn has_pending(&self) -> bool {
        !self.carry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(b"hello"), "hello");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_split_multibyte_codepoint() {
        // "é" is 0xC3 0xA9
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(&[0xC3]), "");
        assert!(decoder.has_pending());
        assert_eq!(decoder.feed(&[0xA9]), "é");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_split_four_byte_codepoint() {
        // "📊" is 0xF0 0x9F 0x93 0x8A, split three ways
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(&[0xF0, 0x9F]), "");
        assert_eq!(decoder.feed(&[0x93]), "");
        assert_eq!(decoder.feed(&[0x8A]), "📊");
    }

    #[test]
    fn test_arbitrary_chunking_matches_whole_decode() {
        let text = "xin chào 📊 biểu đồ";
        let bytes = text.as_bytes();
        for size in 1..=5 {
            let mut decoder = Utf8Decoder::new();
            let mut out = String::new();
            for chunk in bytes.chunks(size) {
                out.push_str(&decoder.feed(chunk));
            }
            out.push_str(&decoder.finish());
            assert_eq!(out, text, "chunk size {size}");
        }
    }

    #[test]
    fn test_invalid_bytes_replaced_inline() {
        let mut decoder = Utf8Decoder::new();
        // 0xFF can never start a valid sequence
        assert_eq!(decoder.feed(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }

    #[test]
    fn test_finish_flushes_incomplete_tail() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(&[b'a', 0xC3]), "a");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert!(!decoder.has_pending());
    }
}
