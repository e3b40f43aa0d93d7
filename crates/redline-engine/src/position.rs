use serde::{Deserialize, Serialize};

/// An offset into the host document's flattened position space.
///
/// For the reference [`Document`](crate::editing::Document) this is a byte
/// offset into the rope; other hosts may use any monotonic addressing as long
/// as their [`PositionMapper`](crate::editing::PositionMapper) agrees.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Position(pub usize);

impl From<usize> for Position {
    fn from(offset: usize) -> Self {
        Position(offset)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A half-open position range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub fn new(start: impl Into<Position>, end: impl Into<Position>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Returns the length. Uses saturating subtraction so inverted spans are empty.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.0.saturating_sub(self.start.0)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Clamp both ends into `[0, size]`
    #[must_use]
    pub fn clamp_to(self, size: usize) -> Span {
        Span::new(self.start.0.min(size), self.end.0.min(size))
    }

    #[must_use]
    pub fn to_range(self) -> std::ops::Range<usize> {
        self.start.0..self.end.0
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}
