//! Fuzz target for LineFramer chunking
//!
//! # Strategy
//!
//! - Stream: arbitrary bytes with a bias towards newlines
//! - Chunking: arbitrary split points, including empty chunks
//!
//! # Invariants
//!
//! - Framing in chunks yields the same lines as framing the whole stream
//! - No emitted line is empty or contains the delimiter
//! - Bytes after the last delimiter stay buffered until `finish`

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use melt_proto::LineFramer;

#[derive(Debug, Arbitrary)]
struct Input {
    stream: Vec<StreamByte>,
    cuts: Vec<u16>,
}

#[derive(Debug, Arbitrary)]
enum StreamByte {
    Newline,
    Space,
    Byte(u8),
}

impl StreamByte {
    fn value(&self) -> u8 {
        match self {
            Self::Newline => b'\n',
            Self::Space => b' ',
            Self::Byte(b) => *b,
        }
    }
}

fuzz_target!(|input: Input| {
    let stream: Vec<u8> = input.stream.iter().map(StreamByte::value).collect();

    let mut whole = LineFramer::new();
    let expected = whole.push(&stream);
    let expected_rest = whole.finish();

    let mut cuts: Vec<usize> =
        input.cuts.iter().map(|c| usize::from(*c) % (stream.len() + 1)).collect();
    cuts.sort_unstable();

    let mut framer = LineFramer::new();
    let mut lines = Vec::new();
    let mut start = 0;
    for cut in cuts.into_iter().chain(std::iter::once(stream.len())) {
        lines.extend(framer.push(&stream[start..cut]));
        start = cut;
    }

    assert_eq!(lines, expected);
    assert_eq!(framer.finish(), expected_rest);
    assert!(lines.iter().all(|l| !l.is_empty() && !l.contains('\n')));
});
