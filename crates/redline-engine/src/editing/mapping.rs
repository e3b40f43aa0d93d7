use xi_rope::delta::DeltaElement;
use xi_rope::{Delta, RopeInfo};

use crate::position::{Position, Span};

/// Which side of an insertion a mapped position sticks to.
///
/// Only matters when text is inserted exactly at the position being mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Stay before the inserted text
    Before,
    /// Move past the inserted text
    After,
}

/// Outcome of mapping one position through an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    /// The position in the new document. For a deleted position this is the
    /// edge of the replacement chosen by the association.
    pub pos: Position,
    /// The position sat strictly inside content the edit removed
    pub deleted: bool,
}

/// Translates positions recorded against an older document into the current one.
///
/// Hosts provide this after every committed mutation. Proposal ranges are
/// re-projected with [`map_span`](PositionMapper::map_span), whose default is
/// derived from [`map_result`](PositionMapper::map_result).
pub trait PositionMapper {
    fn map_result(&self, pos: Position, assoc: Assoc) -> MapResult;

    /// Map a position, returning `None` if it was inside deleted content
    fn map_position(&self, pos: Position, assoc: Assoc) -> Option<Position> {
        let result = self.map_result(pos, assoc);
        (!result.deleted).then_some(result.pos)
    }

    /// Map a range so that insertions at either edge do not grow it.
    ///
    /// Returns `None` when the mapped range is empty.
    fn map_span(&self, span: Span) -> Option<Span> {
        let start = self.map_result(span.start, Assoc::After);
        let end = self.map_result(span.end, Assoc::Before);
        if start.pos >= end.pos {
            return None;
        }
        Some(Span {
            start: start.pos,
            end: end.pos,
        })
    }
}

/// One replaced region of a single edit, in old-document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Replaced {
    old_start: usize,
    old_end: usize,
    inserted: usize,
}

/// Position map for one atomic edit (one delta)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepMap {
    regions: Vec<Replaced>,
}

impl StepMap {
    /// Build from `(old_range, inserted_len)` pairs.
    ///
    /// Regions must be sorted and non-overlapping; out of order regions are
    /// sorted here.
    pub fn new(regions: impl IntoIterator<Item = (std::ops::Range<usize>, usize)>) -> Self {
        let mut regions: Vec<Replaced> = regions
            .into_iter()
            .map(|(range, inserted)| Replaced {
                old_start: range.start,
                old_end: range.end.max(range.start),
                inserted,
            })
            .filter(|r| r.old_end > r.old_start || r.inserted > 0)
            .collect();
        regions.sort_by_key(|r| r.old_start);
        Self { regions }
    }

    /// Extract replaced regions from an xi-rope delta.
    ///
    /// Gaps between `Copy` elements are deletions and `Insert` elements land at
    /// the current old-document position, so a gap with pending inserts is a
    /// replacement.
    pub fn from_delta(delta: &Delta<RopeInfo>) -> Self {
        let mut regions = Vec::new();
        let mut old_pos = 0;
        let mut pending_insert = 0;

        for op in &delta.els {
            match op {
                DeltaElement::Copy(from, to) => {
                    if old_pos < *from || pending_insert > 0 {
                        regions.push(Replaced {
                            old_start: old_pos,
                            old_end: *from,
                            inserted: pending_insert,
                        });
                    }
                    pending_insert = 0;
                    old_pos = *to;
                }
                DeltaElement::Insert(node) => {
                    pending_insert += node.len();
                }
            }
        }

        // Trailing deletion or append
        if old_pos < delta.base_len || pending_insert > 0 {
            regions.push(Replaced {
                old_start: old_pos,
                old_end: delta.base_len,
                inserted: pending_insert,
            });
        }

        Self { regions }
    }

    /// Signed length change of the edit
    pub fn size_delta(&self) -> isize {
        self.regions
            .iter()
            .map(|r| r.inserted as isize - (r.old_end - r.old_start) as isize)
            .sum()
    }

    /// True when one replaced region swallows the whole span
    fn consumes(&self, span: Span) -> bool {
        self.regions.iter().any(|r| {
            r.old_end > r.old_start && r.old_start <= span.start.0 && span.end.0 <= r.old_end
        })
    }

    fn map(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut diff: isize = 0;

        for region in &self.regions {
            if pos < region.old_start {
                break;
            }
            let shifted_start = (region.old_start as isize + diff) as usize;
            let replacement_end = shifted_start + region.inserted;

            if pos == region.old_start && region.old_end == region.old_start {
                // Pure insertion at the position
                let mapped = match assoc {
                    Assoc::Before => shifted_start,
                    Assoc::After => replacement_end,
                };
                return MapResult {
                    pos: Position(mapped),
                    deleted: false,
                };
            }
            if pos == region.old_start {
                return MapResult {
                    pos: Position(shifted_start),
                    deleted: false,
                };
            }
            if pos < region.old_end {
                let mapped = match assoc {
                    Assoc::Before => shifted_start,
                    Assoc::After => replacement_end,
                };
                return MapResult {
                    pos: Position(mapped),
                    deleted: true,
                };
            }
            if pos == region.old_end {
                return MapResult {
                    pos: Position(replacement_end),
                    deleted: false,
                };
            }

            diff += region.inserted as isize - (region.old_end - region.old_start) as isize;
        }

        MapResult {
            pos: Position((pos as isize + diff).max(0) as usize),
            deleted: false,
        }
    }
}

/// A sequence of edits, mapped through in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    steps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_delta(delta: &Delta<RopeInfo>) -> Self {
        Self {
            steps: vec![StepMap::from_delta(delta)],
        }
    }

    /// Mapping for a single replacement of `range` by `inserted` positions
    pub fn replace(range: std::ops::Range<usize>, inserted: usize) -> Self {
        Self {
            steps: vec![StepMap::new([(range, inserted)])],
        }
    }

    /// Compose: `other` happened after the edits already in `self`
    pub fn append(&mut self, other: Mapping) {
        self.steps.extend(other.steps);
    }

    pub fn size_delta(&self) -> isize {
        self.steps.iter().map(StepMap::size_delta).sum()
    }
}

impl PositionMapper for Mapping {
    fn map_result(&self, pos: Position, assoc: Assoc) -> MapResult {
        let mut deleted = false;
        let mut current = pos.0;
        for step in &self.steps {
            let result = step.map(current, assoc);
            deleted |= result.deleted;
            current = result.pos.0;
        }
        MapResult {
            pos: Position(current),
            deleted,
        }
    }

    fn map_span(&self, span: Span) -> Option<Span> {
        self.steps
            .iter()
            .try_fold(span, |current, step| step.map_span(current))
    }
}

impl PositionMapper for StepMap {
    fn map_result(&self, pos: Position, assoc: Assoc) -> MapResult {
        self.map(pos.0, assoc)
    }

    /// A span whose old content was entirely removed does not survive, even
    /// when the same edit inserted new text in its place.
    fn map_span(&self, span: Span) -> Option<Span> {
        if self.consumes(span) {
            return None;
        }
        let start = self.map(span.start.0, Assoc::After);
        let end = self.map(span.end.0, Assoc::Before);
        (start.pos < end.pos).then_some(Span {
            start: start.pos,
            end: end.pos,
        })
    }
}
