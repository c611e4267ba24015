/// Decodes UTF-8 that arrives split across arbitrary chunk boundaries.
#[derive(Debug, Default)]
pub struct Utf8Accumulator {
    pending: Vec<u8>,
}

impl Utf8Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text completed by `bytes`.
    ///
    /// A trailing incomplete sequence is held back for the next call.
    /// Invalid bytes become U+FFFD.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flushes whatever is held back; an unfinished sequence becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_ascii_through() {
        let mut acc = Utf8Accumulator::new();
        assert_eq!(acc.push(b"{\"a\""), "{\"a\"");
        assert!(!acc.has_pending());
    }

    #[test]
    fn joins_sequences_split_across_chunks() {
        let text = "كتاب";
        let bytes = text.as_bytes();
        let mut acc = Utf8Accumulator::new();
        let mut out = String::new();

        for byte in bytes {
            out.push_str(&acc.push(std::slice::from_ref(byte)));
        }

        assert_eq!(out, text);
        assert!(!acc.has_pending());
    }

    #[test]
    fn holds_back_incomplete_tail() {
        let mut acc = Utf8Accumulator::new();
        let bytes = "aé".as_bytes();

        assert_eq!(acc.push(&bytes[..2]), "a");
        assert!(acc.has_pending());
        assert_eq!(acc.push(&bytes[2..]), "é");
    }

    #[test]
    fn replaces_invalid_bytes() {
        let mut acc = Utf8Accumulator::new();
        assert_eq!(acc.push(b"a\xffb"), "a\u{fffd}b");
    }

    #[test]
    fn finish_flushes_unfinished_sequence() {
        let mut acc = Utf8Accumulator::new();
        acc.push(&"é".as_bytes()[..1]);
        assert_eq!(acc.finish(), "\u{fffd}");
        assert!(!acc.has_pending());
    }
}
