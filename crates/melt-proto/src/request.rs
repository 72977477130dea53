//! Outbound requests from the probe to the compiler.

use std::fmt;

/// Terminator after every outbound request. Doubled on purpose: the MELT
/// runtime reads requests as blank-line separated paragraphs.
pub const REQUEST_TERMINATOR: &str = "\n\n";

/// Requests the probe can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Ask the compiler to describe what is known at a mark.
    InfoLocation {
        /// Mark to describe
        mark_id: u64,
    },
}

impl Request {
    /// Wire keyword of the request.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::InfoLocation { .. } => "INFOLOCATION_prq",
        }
    }

    /// Request text without the terminator, as shown in the trace log.
    pub fn text(&self) -> String {
        self.to_string()
    }

    /// Exact bytes written to the request descriptor.
    pub fn encode(&self) -> Vec<u8> {
        format!("{self}{REQUEST_TERMINATOR}").into_bytes()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InfoLocation { mark_id } => write!(f, "{} {mark_id}", self.keyword()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_location_wire_format() {
        let request = Request::InfoLocation { mark_id: 7 };
        assert_eq!(request.encode(), b"INFOLOCATION_prq 7\n\n");
        assert_eq!(request.text(), "INFOLOCATION_prq 7");
    }
}
