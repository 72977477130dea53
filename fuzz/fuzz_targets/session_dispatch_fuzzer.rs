//! Fuzz target for session registration through the dispatcher
//!
//! # Strategy
//!
//! - Well-formed command lines with small id ranges so duplicates are common
//! - Wire coordinates around zero to exercise the 1-based conversion floor
//!
//! # Invariants
//!
//! - First registration wins for files and marks
//! - Repeated mark events carry the first registered position
//! - Registered coordinates are the wire values minus one, floored at zero
//! - Info commands only produce domain events for registered marks

#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use melt_core::{Dispatcher, DomainEvent, Outcome};

#[derive(Debug, Arbitrary)]
enum Line {
    ShowFile { file_id: u8, name: u8 },
    Mark { mark_id: u8, file_id: u8, line: i8, column: i8 },
    StartInfo { mark_id: u8 },
    AddInfo { mark_id: u8, text: u8 },
}

impl Line {
    fn render(&self) -> String {
        match self {
            Self::ShowFile { file_id, name } => {
                format!("SHOWFILE_PCD x \"f{name}.c\" y {file_id}")
            },
            Self::Mark { mark_id, file_id, line, column } => {
                format!("MARKLOCATION_PCD {mark_id} {file_id} {line} {column}")
            },
            Self::StartInfo { mark_id } => format!("STARTINFOLOC_PCD {mark_id}"),
            Self::AddInfo { mark_id, text } => format!("ADDINFOLOC_PCD {mark_id} \"v{text}\""),
        }
    }
}

fn floor(wire: i8) -> u32 {
    (i64::from(wire) - 1).max(0) as u32
}

fuzz_target!(|lines: Vec<Line>| {
    let mut dispatcher = Dispatcher::new();
    let mut first_file: HashMap<u64, String> = HashMap::new();
    let mut first_mark: HashMap<u64, (u32, u32)> = HashMap::new();

    for line in &lines {
        let outcome = dispatcher.dispatch(&line.render()).outcome;

        match line {
            Line::ShowFile { file_id, name } => {
                first_file.entry(u64::from(*file_id)).or_insert_with(|| format!("f{name}.c"));
            },
            Line::Mark { mark_id, line, column, .. } => {
                let first = *first_mark
                    .entry(u64::from(*mark_id))
                    .or_insert((floor(*line), floor(*column)));
                if let Outcome::Domain(DomainEvent::MarkLocation { line, column, .. }) = outcome {
                    assert_eq!((line, column), first);
                }
            },
            Line::StartInfo { mark_id } | Line::AddInfo { mark_id, .. } => {
                let known = first_mark.contains_key(&u64::from(*mark_id));
                assert_eq!(matches!(outcome, Outcome::Domain(_)), known);
            },
        }
    }

    let session = dispatcher.session();
    for (file_id, name) in &first_file {
        assert_eq!(session.file(*file_id).map(|f| f.filename.as_str()), Some(name.as_str()));
    }
    for (mark_id, position) in &first_mark {
        let mark = session.mark(*mark_id).map(|m| (m.line, m.column));
        assert_eq!(mark, Some(*position));
    }
});
