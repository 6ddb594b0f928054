//! Incremental decoding of the raw byte stream into the text buffer.
//!
//! A UTF-8 codepoint split across two reads must not turn into a
//! replacement character, so up to three trailing bytes are carried
//! between calls.  Legacy 8-bit terminals (and X10 mouse coordinate
//! bytes) are handled by the Latin-1 mode, a straight byte-to-char map.

/// Input encodings the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEncoding {
    Utf8,
    Latin1,
}

/// Streaming decoder with carry-over state for split codepoints.
#[derive(Debug)]
pub struct IncrementalDecoder {
    encoding: InputEncoding,
    pending: Vec<u8>,
}

impl IncrementalDecoder {
    pub fn new(encoding: InputEncoding) -> Self {
        Self {
            encoding,
            pending: Vec::with_capacity(4),
        }
    }

    pub fn encoding(&self) -> InputEncoding {
        self.encoding
    }

    /// Bytes held back waiting for the rest of a codepoint.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop any carried bytes (used by flushinp).
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Decode `bytes`, appending completed characters to `out`.
    /// Invalid input yields one replacement character per bad byte.
    pub fn decode(&mut self, bytes: &[u8], out: &mut String) {
        match self.encoding {
            InputEncoding::Latin1 => self.decode_latin1(bytes, out),
            InputEncoding::Utf8 => self.decode_utf8(bytes, out),
        }
    }

    /// Decode as Latin-1 regardless of the configured encoding: used
    /// for X10 mouse coordinate bytes, which are raw values offset by
    /// 32 and not valid UTF-8 beyond 0x7f.
    pub fn decode_latin1(&mut self, bytes: &[u8], out: &mut String) {
        for &b in self.pending.iter().chain(bytes.iter()) {
            out.push(char::from(b));
        }
        self.pending.clear();
    }

    fn decode_utf8(&mut self, bytes: &[u8], out: &mut String) {
        self.pending.extend_from_slice(bytes);
        let mut i = 0;
        while i < self.pending.len() {
            let lead = self.pending[i];
            if lead < 0x80 {
                out.push(char::from(lead));
                i += 1;
                continue;
            }
            let need = match lead {
                0xc2..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf4 => 4,
                _ => {
                    log::warn!("invalid utf-8 lead byte {:#04x} in keyboard input", lead);
                    out.push(char::REPLACEMENT_CHARACTER);
                    i += 1;
                    continue;
                }
            };
            if self.pending.len() - i < need {
                // split codepoint, keep the tail for the next read
                break;
            }
            match std::str::from_utf8(&self.pending[i..i + need]) {
                Ok(s) => {
                    out.push_str(s);
                    i += need;
                }
                Err(_) => {
                    log::warn!("invalid utf-8 continuation in keyboard input");
                    out.push(char::REPLACEMENT_CHARACTER);
                    i += 1;
                }
            }
        }
        self.pending.drain(..i);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use k9::assert_equal as assert_eq;

    fn decode_all(dec: &mut IncrementalDecoder, bytes: &[u8]) -> String {
        let mut out = String::new();
        dec.decode(bytes, &mut out);
        out
    }

    #[test]
    fn ascii_passthrough() {
        let mut dec = IncrementalDecoder::new(InputEncoding::Utf8);
        assert_eq!(decode_all(&mut dec, b"hello\x1b[A"), "hello\x1b[A".to_string());
        assert!(!dec.has_pending());
    }

    #[test]
    fn split_codepoint_across_reads() {
        let mut dec = IncrementalDecoder::new(InputEncoding::Utf8);
        let omega = "Ω".as_bytes();
        assert_eq!(decode_all(&mut dec, &omega[..1]), String::new());
        assert!(dec.has_pending());
        assert_eq!(decode_all(&mut dec, &omega[1..]), "Ω".to_string());
        assert!(!dec.has_pending());
    }

    #[test]
    fn four_byte_emoji_split_three_ways() {
        let mut dec = IncrementalDecoder::new(InputEncoding::Utf8);
        let crab = "🦀".as_bytes();
        assert_eq!(decode_all(&mut dec, &crab[..2]), String::new());
        assert_eq!(decode_all(&mut dec, &crab[2..3]), String::new());
        assert_eq!(decode_all(&mut dec, &crab[3..]), "🦀".to_string());
    }

    #[test]
    fn invalid_bytes_become_replacements() {
        let mut dec = IncrementalDecoder::new(InputEncoding::Utf8);
        assert_eq!(decode_all(&mut dec, b"a\xffb"), "a\u{fffd}b".to_string());
        // a lead byte followed by a non-continuation advances one byte
        assert_eq!(decode_all(&mut dec, b"\xc3\x28"), "\u{fffd}(".to_string());
    }

    #[test]
    fn latin1_maps_high_bytes() {
        let mut dec = IncrementalDecoder::new(InputEncoding::Latin1);
        assert_eq!(decode_all(&mut dec, b"\x1b[M \xff!"), "\x1b[M \u{ff}!".to_string());
    }

    #[test]
    fn reset_discards_pending() {
        let mut dec = IncrementalDecoder::new(InputEncoding::Utf8);
        decode_all(&mut dec, &"Ω".as_bytes()[..1]);
        assert!(dec.has_pending());
        dec.reset();
        assert!(!dec.has_pending());
        assert_eq!(decode_all(&mut dec, b"x"), "x".to_string());
    }
}
