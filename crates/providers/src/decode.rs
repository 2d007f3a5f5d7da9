//! Incremental UTF-8 decoder for chunked text responses.
//!
//! HTTP chunk boundaries do not respect character boundaries, so a multi-byte
//! character may arrive split across two chunks. The decoder holds the
//! incomplete tail until the rest shows up.

use anyhow::{anyhow, Result};

/// Buffers an incomplete trailing character across chunk boundaries.
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feed raw bytes from the response body. Returns all text that is complete so far.
    ///
    /// Invalid byte sequences are an error; an incomplete trailing sequence is kept
    /// for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<String> {
        self.pending.extend_from_slice(chunk);

        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let out = text.to_string();
                self.pending.clear();
                Ok(out)
            }
            Err(e) if e.error_len().is_none() => {
                // Only the tail is incomplete
                let valid = e.valid_up_to();
                let out = std::str::from_utf8(&self.pending[..valid])
                    .map_err(|e| anyhow!("invalid utf-8 in stream: {}", e))?
                    .to_string();
                self.pending.drain(..valid);
                Ok(out)
            }
            Err(e) => Err(anyhow!("invalid utf-8 in stream: {}", e)),
        }
    }

    /// Call at end of stream. Leftover bytes mean the body was cut mid-character.
    pub fn finish(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            let leftover = self.pending.len();
            self.pending.clear();
            Err(anyhow!(
                "stream ended inside a multi-byte character ({} bytes left)",
                leftover
            ))
        }
    }
}

impl Default for Utf8Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(b"Hel").unwrap(), "Hel");
        assert_eq!(decoder.feed(b"lo").unwrap(), "lo");
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_split_multibyte_character() {
        // "§ 103" where the section sign is 0xC2 0xA7
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(&[0xC2]).unwrap(), "");
        assert_eq!(decoder.feed(&[0xA7, b' ', b'1', b'0', b'3']).unwrap(), "§ 103");
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_partial_tail_keeps_prefix() {
        let mut decoder = Utf8Decoder::new();
        let bytes = "ab€".as_bytes();
        assert_eq!(decoder.feed(&bytes[..3]).unwrap(), "ab");
        assert_eq!(decoder.feed(&bytes[3..]).unwrap(), "€");
    }

    #[test]
    fn test_invalid_sequence_is_error() {
        let mut decoder = Utf8Decoder::new();
        assert!(decoder.feed(&[b'o', b'k', 0xFF, b'!']).is_err());
    }

    #[test]
    fn test_truncated_body_fails_on_finish() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(&[0xE2, 0x82]).unwrap(), "");
        assert!(decoder.finish().is_err());
    }
}
