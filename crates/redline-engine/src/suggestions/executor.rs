use thiserror::Error;

use crate::editing::{HostDocument, Patch, ReplaceError};
use crate::position::Position;
use crate::suggestions::proposal::{Outcome, ProposalId};
use crate::suggestions::store::ProposalStore;

/// Why an accept left the document untouched
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error(
        "suggestion {id} is no longer valid because the document changed ({from}..{to} in a document of {size})"
    )]
    StaleRange {
        id: ProposalId,
        from: Position,
        to: Position,
        size: usize,
    },

    #[error("suggestion could not be applied: {0}")]
    Rejected(#[from] ReplaceError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcceptOutcome {
    /// The suggestion was written; the patch describes the edit
    Applied(Patch),
    /// Unknown id, or the proposal was already resolved
    AlreadyResolved,
}

/// Write a pending proposal's suggested content over its current range.
///
/// The host replacement is the only mutation: on failure the document and
/// the proposal are left exactly as they were and the proposal stays
/// pending. On success the other pending proposals are re-projected through
/// the edit.
pub fn accept<H: HostDocument + ?Sized>(
    store: &mut ProposalStore,
    host: &mut H,
    id: ProposalId,
) -> Result<AcceptOutcome, ApplyError> {
    let Some(proposal) = store.get(id) else {
        return Ok(AcceptOutcome::AlreadyResolved);
    };

    let span = proposal.normalized.span();
    let size = host.size();
    if span.is_empty() || span.end.0 > size {
        log::warn!(
            "not applying proposal {id}: range {}..{} is stale in a document of {size}",
            span.start,
            span.end
        );
        return Err(ApplyError::StaleRange {
            id,
            from: span.start,
            to: span.end,
            size,
        });
    }

    let patch = host
        .replace_range(span, &proposal.suggested_content)
        .inspect_err(|err| log::warn!("not applying proposal {id}: {err}"))?;

    store.resolve(id, Outcome::Accepted);
    store.reproject_all(&patch.mapping);
    Ok(AcceptOutcome::Applied(patch))
}

/// Discard a proposal without touching the document.
///
/// Returns `false` when there was nothing pending to reject.
pub fn reject(store: &mut ProposalStore, id: ProposalId) -> bool {
    store.resolve(id, Outcome::Rejected).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentNode, Fragment};
    use crate::editing::Document;
    use crate::position::Span;
    use crate::suggestions::proposal::{
        DiffProposal, NormalizedRange, PreviewKind, SelectionRange,
    };
    use pretty_assertions::assert_eq;

    fn register(store: &mut ProposalStore, from: usize, to: usize, suggested: Fragment) -> ProposalId {
        store
            .register(DiffProposal::new(
                PreviewKind::RangeReplace,
                SelectionRange::new(from, to),
                NormalizedRange::new(from, to),
                Fragment::default(),
                suggested,
                vec![],
            ))
            .unwrap()
    }

    #[test]
    fn test_accept_replaces_and_resolves() {
        let mut doc = Document::from_bytes(b"Hello World").unwrap();
        let mut store = ProposalStore::new();
        let id = register(&mut store, 6, 11, Fragment::text("There"));

        let outcome = accept(&mut store, &mut doc, id).unwrap();

        assert!(matches!(outcome, AcceptOutcome::Applied(_)));
        assert_eq!(doc.text(), "Hello There");
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_accept_twice_is_a_no_op() {
        let mut doc = Document::from_bytes(b"Hello World").unwrap();
        let mut store = ProposalStore::new();
        let id = register(&mut store, 0, 5, Fragment::text("Howdy"));

        accept(&mut store, &mut doc, id).unwrap();
        let again = accept(&mut store, &mut doc, id).unwrap();

        assert_eq!(again, AcceptOutcome::AlreadyResolved);
        assert_eq!(doc.text(), "Howdy World");
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_accept_moves_other_proposals() {
        let mut doc = Document::from_bytes(b"one two three").unwrap();
        let mut store = ProposalStore::new();
        let first = register(&mut store, 0, 3, Fragment::text("ONE!!"));
        let last = register(&mut store, 8, 13, Fragment::text("3"));

        accept(&mut store, &mut doc, first).unwrap();

        assert_eq!(
            store.get(last).unwrap().normalized.span(),
            Span::new(10, 15)
        );
        accept(&mut store, &mut doc, last).unwrap();
        assert_eq!(doc.text(), "ONE!! two 3");
    }

    #[test]
    fn test_stale_range_leaves_everything_alone() {
        let mut doc = Document::from_bytes(b"Hi").unwrap();
        let mut store = ProposalStore::new();
        let id = register(&mut store, 0, 9, Fragment::text("x"));

        let err = accept(&mut store, &mut doc, id).unwrap_err();

        assert_eq!(
            err,
            ApplyError::StaleRange {
                id,
                from: Position(0),
                to: Position(9),
                size: 2
            }
        );
        assert_eq!(doc.text(), "Hi");
        assert!(store.get(id).unwrap().is_pending());
    }

    #[test]
    fn test_host_refusal_keeps_proposal_pending() {
        let mut doc = Document::from_bytes(b"Hello World").unwrap();
        let mut store = ProposalStore::new();
        let id = register(
            &mut store,
            6,
            11,
            Fragment::new(vec![ContentNode::heading(1, "Mid-line heading")]),
        );

        let err = accept(&mut store, &mut doc, id).unwrap_err();

        assert_eq!(
            err,
            ApplyError::Rejected(ReplaceError::BlockMidLine(Position(6)))
        );
        assert_eq!(doc.text(), "Hello World");
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_reject_is_idempotent() {
        let mut doc = Document::from_bytes(b"Hello").unwrap();
        let mut store = ProposalStore::new();
        let id = register(&mut store, 0, 5, Fragment::text("Bye"));

        assert!(reject(&mut store, id));
        assert!(!reject(&mut store, id));
        assert_eq!(accept(&mut store, &mut doc, id), Ok(AcceptOutcome::AlreadyResolved));
        assert_eq!(doc.text(), "Hello");
    }
}
