use crate::editing::{Assoc, PositionMapper};
use crate::suggestions::proposal::{DiffProposal, Outcome, ProposalId, SelectionRange};

/// The live set of pending proposals for one editing session.
///
/// Proposals are kept in registration order, which is also the order the
/// overlay draws them in. A proposal leaves the store the moment it stops
/// being pending: resolved by the user, or dropped because its anchor no
/// longer maps onto the document.
#[derive(Debug, Default)]
pub struct ProposalStore {
    proposals: Vec<DiffProposal>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pending proposal. Malformed proposals are refused and logged.
    pub fn register(&mut self, proposal: DiffProposal) -> Option<ProposalId> {
        let id = proposal.id;
        let range = proposal.normalized;

        if range.to <= range.from {
            log::warn!(
                "refusing proposal {id}: empty or inverted range {}..{}",
                range.from,
                range.to
            );
            return None;
        }
        if !range.encloses(proposal.selection) {
            log::warn!(
                "refusing proposal {id}: selection {}..{} is not inside {}..{}",
                proposal.selection.raw_from,
                proposal.selection.raw_to,
                range.from,
                range.to
            );
            return None;
        }
        if !proposal.is_pending() {
            log::warn!("refusing proposal {id}: status is {:?}", proposal.status);
            return None;
        }
        if self.get(id).is_some() {
            log::warn!("refusing proposal {id}: already registered");
            return None;
        }

        self.proposals.push(proposal);
        Some(id)
    }

    pub fn get(&self, id: ProposalId) -> Option<&DiffProposal> {
        self.proposals.iter().find(|proposal| proposal.id == id)
    }

    /// Pending proposals in registration order
    pub fn list(&self) -> Vec<&DiffProposal> {
        self.proposals
            .iter()
            .filter(|proposal| proposal.is_pending())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Move a proposal to its terminal status and out of the live set.
    ///
    /// Returns the resolved proposal, or `None` when `id` is unknown or was
    /// already resolved. Repeating a resolution is a no-op.
    pub fn resolve(&mut self, id: ProposalId, outcome: Outcome) -> Option<DiffProposal> {
        let index = self
            .proposals
            .iter()
            .position(|proposal| proposal.id == id && proposal.is_pending())?;
        let mut proposal = self.proposals.remove(index);
        proposal.status = outcome.into();
        Some(proposal)
    }

    /// Carry every pending proposal through a document edit.
    ///
    /// Proposals whose range maps to nothing are dropped without being
    /// resolved. Returns the ids that were dropped.
    pub fn reproject_all(&mut self, mapper: &impl PositionMapper) -> Vec<ProposalId> {
        let mut dropped = Vec::new();

        self.proposals.retain_mut(|proposal| {
            let Some(span) = mapper.map_span(proposal.normalized.span()) else {
                log::debug!("dropping proposal {}: its range was deleted", proposal.id);
                dropped.push(proposal.id);
                return false;
            };

            let raw_from = mapper
                .map_result(proposal.selection.raw_from, Assoc::After)
                .pos
                .clamp(span.start, span.end);
            let raw_to = mapper
                .map_result(proposal.selection.raw_to, Assoc::Before)
                .pos
                .clamp(raw_from, span.end);

            proposal.normalized = span.into();
            proposal.selection = SelectionRange { raw_from, raw_to };
            true
        });

        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Fragment;
    use crate::editing::Mapping;
    use crate::position::{Position, Span};
    use crate::suggestions::proposal::{NormalizedRange, PreviewKind, ProposalStatus};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn proposal(from: usize, to: usize) -> DiffProposal {
        DiffProposal::new(
            PreviewKind::RangeReplace,
            SelectionRange::new(from, to),
            NormalizedRange::new(from, to),
            Fragment::text("old"),
            Fragment::text("new"),
            vec![],
        )
    }

    #[test]
    fn test_register_and_list_in_order() {
        let mut store = ProposalStore::new();
        let first = store.register(proposal(5, 10)).unwrap();
        let second = store.register(proposal(0, 2)).unwrap();

        let ids: Vec<_> = store.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(store.get(first).unwrap().normalized, NormalizedRange::new(5, 10));
    }

    #[rstest]
    #[case::empty(4, 4)]
    #[case::inverted(9, 3)]
    fn test_register_refuses_bad_range(#[case] from: usize, #[case] to: usize) {
        let mut store = ProposalStore::new();
        let mut bad = proposal(0, 1);
        bad.normalized = NormalizedRange::new(from, to);

        assert_eq!(store.register(bad), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_register_refuses_selection_outside_range() {
        let mut store = ProposalStore::new();
        let mut bad = proposal(2, 6);
        bad.selection = SelectionRange::new(1, 6);

        assert_eq!(store.register(bad), None);
    }

    #[test]
    fn test_register_refuses_duplicates_and_resolved() {
        let mut store = ProposalStore::new();
        let original = proposal(0, 4);
        store.register(original.clone()).unwrap();
        assert_eq!(store.register(original), None);

        let mut resolved = proposal(0, 4);
        resolved.status = ProposalStatus::Rejected;
        assert_eq!(store.register(resolved), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut store = ProposalStore::new();
        let id = store.register(proposal(0, 4)).unwrap();

        let resolved = store.resolve(id, Outcome::Rejected).unwrap();
        assert_eq!(resolved.status, ProposalStatus::Rejected);
        assert!(store.list().is_empty());

        assert_eq!(store.resolve(id, Outcome::Accepted), None);
        assert_eq!(store.resolve(ProposalId::new(), Outcome::Accepted), None);
    }

    #[test]
    fn test_reproject_shifts_and_drops() {
        let mut store = ProposalStore::new();
        let kept = store.register(proposal(10, 15)).unwrap();
        let doomed = store.register(proposal(2, 6)).unwrap();

        // Delete 1..8 and insert three characters in its place
        let dropped = store.reproject_all(&Mapping::replace(1..8, 3));

        assert_eq!(dropped, vec![doomed]);
        let moved = store.get(kept).unwrap();
        assert_eq!(moved.normalized.span(), Span::new(6, 11));
        assert_eq!(moved.selection, SelectionRange::new(6, 11));
    }

    #[test]
    fn test_reproject_keeps_selection_inside_range() {
        let mut store = ProposalStore::new();
        let mut partial = proposal(0, 10);
        partial.selection = SelectionRange::new(2, 8);
        let id = store.register(partial).unwrap();

        // Delete 6..12: the tail of the range goes away
        store.reproject_all(&Mapping::replace(6..12, 0));

        let moved = store.get(id).unwrap();
        assert_eq!(moved.normalized, NormalizedRange::new(0, 6));
        assert_eq!(moved.selection.raw_to, Position(6));
        assert!(moved.normalized.encloses(moved.selection));
    }
}
