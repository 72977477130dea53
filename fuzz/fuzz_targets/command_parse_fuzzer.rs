//! Fuzz target for Command::parse and the dispatcher
//!
//! Arbitrary bytes are decoded the way the framer decodes them (lossy UTF-8)
//! and pushed through parsing and dispatch.
//!
//! # Invariants
//!
//! - Parsing never panics; known keywords with bad fields return `ParseError`
//!   and downgrade to `Unrecognized` with every token kept
//! - Every dispatched line yields exactly one command trace event
//! - The traced tokens are the `split(' ')` tokens of the line

#![no_main]

use libfuzzer_sys::fuzz_target;
use melt_core::{Dispatcher, TraceEvent};
use melt_proto::{Command, parse_line, tokenize};

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    let parsed = parse_line(&line);
    if let Command::Unrecognized { tokens } = &parsed.command {
        assert_eq!(tokens, &tokenize(&line));
    } else {
        assert!(parsed.error.is_none());
    }
    assert_eq!(parsed.error.is_some(), Command::parse(&line).is_err());

    let mut dispatcher = Dispatcher::new();
    let dispatch = dispatcher.dispatch(&line);
    let TraceEvent::Command { tokens } = &dispatch.trace else {
        panic!("dispatch produced a non-command trace");
    };
    assert_eq!(tokens.len(), tokenize(&line).len());
});
