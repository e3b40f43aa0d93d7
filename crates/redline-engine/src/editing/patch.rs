use crate::editing::Mapping;

/// Result of committing an edit: the change notification hosts hand to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Byte ranges of inserted text, in new-document coordinates
    pub changed: Vec<std::ops::Range<usize>>,
    /// How positions recorded before the edit move through it
    pub mapping: Mapping,
    pub version: u64,
}
