//! Files and marks announced during a probe session.
//!
//! # Invariants
//!
//! - First write wins: the first record for an id is authoritative. Later
//!   registrations for the same id are no-ops, not errors.
//! - A mark may name a file that has not been shown yet. It is kept and becomes
//!   part of that file's mark set once the file registers.
//! - Ids are never removed or reused for the lifetime of the session.

use std::collections::{BTreeSet, HashMap};

/// A file shown by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Protocol file id.
    pub file_id: u64,
    /// Path as sent by the compiler (quotes stripped).
    pub filename: String,
    marks: BTreeSet<u64>,
}

impl FileRecord {
    /// Create a record with no marks.
    pub fn new(file_id: u64, filename: impl Into<String>) -> Self {
        Self { file_id, filename: filename.into(), marks: BTreeSet::new() }
    }

    /// Ids of marks bound to this file, ascending.
    pub fn mark_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.marks.iter().copied()
    }
}

/// A numbered source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkRecord {
    /// Protocol mark id.
    pub mark_id: u64,
    /// File the mark points into.
    pub file_id: u64,
    /// 0-based line.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
}

/// Registry of files and marks.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    files: HashMap<u64, FileRecord>,
    marks: HashMap<u64, MarkRecord>,
}

impl SessionState {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file. Returns `false` if the id was already known.
    ///
    /// Marks registered earlier against this file id are adopted.
    pub fn register_file(&mut self, mut record: FileRecord) -> bool {
        let file_id = record.file_id;
        if self.files.contains_key(&file_id) {
            return false;
        }

        record
            .marks
            .extend(self.marks.values().filter(|m| m.file_id == file_id).map(|m| m.mark_id));
        self.files.insert(file_id, record);
        true
    }

    /// Register a mark. Returns `false` if the id was already known.
    pub fn register_mark(&mut self, record: MarkRecord) -> bool {
        if self.marks.contains_key(&record.mark_id) {
            return false;
        }

        if let Some(file) = self.files.get_mut(&record.file_id) {
            file.marks.insert(record.mark_id);
        }
        self.marks.insert(record.mark_id, record);
        true
    }

    /// File by id.
    pub fn file(&self, file_id: u64) -> Option<&FileRecord> {
        self.files.get(&file_id)
    }

    /// Mark by id.
    pub fn mark(&self, mark_id: u64) -> Option<&MarkRecord> {
        self.marks.get(&mark_id)
    }

    /// Marks bound to a registered file, ascending by id.
    ///
    /// Empty if the file is unknown, even if marks reference it.
    pub fn marks_for_file(&self, file_id: u64) -> impl Iterator<Item = &MarkRecord> {
        self.files
            .get(&file_id)
            .into_iter()
            .flat_map(FileRecord::mark_ids)
            .filter_map(|id| self.marks.get(&id))
    }

    /// Number of registered files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of registered marks.
    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn mark(mark_id: u64, file_id: u64) -> MarkRecord {
        MarkRecord { mark_id, file_id, line: 1, column: 2 }
    }

    #[test]
    fn first_file_registration_wins() {
        let mut session = SessionState::new();
        assert!(session.register_file(FileRecord::new(3, "a.c")));
        assert!(!session.register_file(FileRecord::new(3, "b.c")));

        assert_eq!(session.file(3).map(|f| f.filename.as_str()), Some("a.c"));
        assert_eq!(session.file_count(), 1);
    }

    #[test]
    fn first_mark_registration_wins() {
        let mut session = SessionState::new();
        assert!(session.register_mark(MarkRecord { mark_id: 7, file_id: 3, line: 9, column: 4 }));
        assert!(!session.register_mark(MarkRecord { mark_id: 7, file_id: 4, line: 0, column: 0 }));

        assert_eq!(
            session.mark(7).copied(),
            Some(MarkRecord { mark_id: 7, file_id: 3, line: 9, column: 4 })
        );
    }

    #[test]
    fn marks_attach_to_known_file() {
        let mut session = SessionState::new();
        session.register_file(FileRecord::new(1, "a.c"));
        session.register_mark(mark(10, 1));
        session.register_mark(mark(5, 1));
        session.register_mark(mark(6, 2));

        let ids: Vec<u64> = session.marks_for_file(1).map(|m| m.mark_id).collect();
        assert_eq!(ids, vec![5, 10]);
    }

    #[test]
    fn file_adopts_earlier_marks() {
        let mut session = SessionState::new();
        session.register_mark(mark(4, 9));
        assert_eq!(session.marks_for_file(9).count(), 0);

        session.register_file(FileRecord::new(9, "late.c"));
        let ids: Vec<u64> = session.marks_for_file(9).map(|m| m.mark_id).collect();
        assert_eq!(ids, vec![4]);
    }

    proptest! {
        #[test]
        fn registration_is_first_write_wins(names in prop::collection::vec((0u64..8, "[a-z]{1,6}"), 0..64)) {
            let mut session = SessionState::new();
            let mut expected: HashMap<u64, String> = HashMap::new();

            for (file_id, name) in names {
                let fresh = !expected.contains_key(&file_id);
                expected.entry(file_id).or_insert_with(|| name.clone());
                prop_assert_eq!(session.register_file(FileRecord::new(file_id, name)), fresh);
            }

            prop_assert_eq!(session.file_count(), expected.len());
            for (file_id, name) in expected {
                prop_assert_eq!(session.file(file_id).map(|f| f.filename.clone()), Some(name));
            }
        }
    }
}
