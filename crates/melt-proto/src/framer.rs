//! Newline framing for the inbound command stream.
//!
//! The compiler writes commands as `\n`-terminated lines. Reads from the pipe
//! return arbitrary chunks, so a line may arrive in pieces across several
//! polls, or several lines may arrive in one read. [`LineFramer`] keeps the
//! unterminated tail between pushes.
//!
//! # Invariants
//!
//! - Empty lines are swallowed: `"\n\n"` yields nothing.
//! - Framing is chunking-independent: pushing a stream in any split produces
//!   the same lines as pushing it whole.
//! - There is no length limit. A peer that never sends `\n` grows the buffer
//!   without bound; the peer is a local, trusted compiler process.

use bytes::BytesMut;

/// Line delimiter on the wire.
pub const DELIMITER: u8 = b'\n';

/// Incremental line framer.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: BytesMut,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and collect every line they complete.
    ///
    /// Lines are decoded lossily; invalid UTF-8 becomes U+FFFD rather than
    /// dropping the command.
    pub fn push(&mut self, mut data: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        while let Some(pos) = data.iter().position(|&b| b == DELIMITER) {
            let (head, rest) = data.split_at(pos);
            self.buf.extend_from_slice(head);
            if !self.buf.is_empty() {
                let line = self.buf.split();
                lines.push(String::from_utf8_lossy(&line).into_owned());
            }
            data = rest.get(1..).unwrap_or_default();
        }

        self.buf.extend_from_slice(data);
        lines
    }

    /// Bytes buffered for the current, unterminated line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Take the unterminated remainder at end of stream.
    ///
    /// Returns `None` if nothing is buffered.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = self.buf.split();
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}
