//! Proposals follow the document while it is edited underneath them

use pretty_assertions::assert_eq;
use redline_engine::editing::{Cmd, Document};
use redline_engine::{
    EditingSession, Fragment, OverlayConfig, PreviewKind, ProposalDraft, ProposalId,
    SelectionRange,
};
use rstest::rstest;

const REVIEW: &str = include_str!("../test_data/quarterly_review.md");

fn offset_of(needle: &str) -> usize {
    REVIEW
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not in test data"))
}

fn session_with_proposal(needle: &str, kind: PreviewKind) -> (EditingSession<Document>, ProposalId) {
    let mut session = EditingSession::new(
        Document::from_bytes(REVIEW.as_bytes()).unwrap(),
        OverlayConfig::default(),
    );
    let start = offset_of(needle);
    let id = session
        .submit(ProposalDraft::new(
            kind,
            SelectionRange::new(start, start + needle.len()),
            Fragment::text("replacement"),
        ))
        .unwrap();
    (session, id)
}

fn covered_text(session: &EditingSession<Document>, id: ProposalId) -> String {
    let span = session.proposal(id).unwrap().normalized.span();
    session.host().slice_to_cow(span.to_range()).into_owned()
}

#[rstest]
#[case::insert_before("Retire the legacy queue", Cmd::InsertText { at: 0, text: "Draft: ".to_string() })]
#[case::insert_after("Retire the legacy queue", Cmd::InsertText { at: 320, text: "!!".to_string() })]
#[case::delete_before("Importer | Dana", Cmd::DeleteRange { range: 20..48 })]
#[case::replace_before("Book retro", Cmd::ReplaceRange { range: 2..18, text: "Q3 Review".to_string() })]
fn test_unrelated_edit_shifts_by_length_delta(#[case] needle: &str, #[case] edit: Cmd) {
    let (mut session, id) = session_with_proposal(needle, PreviewKind::RangeReplace);
    let before = session.proposal(id).unwrap().normalized;
    let before_text = covered_text(&session, id);

    let patch = session.edit(|doc| doc.apply(edit.clone())).unwrap();

    let after = session.proposal(id).unwrap().normalized;
    let edit_start = patch.changed.first().map_or(0, |range| range.start);
    let delta = if edit_start <= before.from.0 {
        patch.mapping.size_delta()
    } else {
        0
    };
    assert_eq!(after.from.0 as isize, before.from.0 as isize + delta);
    assert_eq!(after.to.0 as isize, before.to.0 as isize + delta);
    assert_eq!(covered_text(&session, id), before_text);
}

#[test]
fn test_typing_at_the_edges_does_not_grow_the_range() {
    let (mut session, id) = session_with_proposal("Stabilise", PreviewKind::RangeReplace);
    let start = offset_of("Stabilise");

    session
        .edit(|doc| {
            doc.apply(Cmd::InsertText {
                at: start + "Stabilise".len(),
                text: "d".to_string(),
            })
        })
        .unwrap();
    session
        .edit(|doc| {
            doc.apply(Cmd::InsertText {
                at: start,
                text: "Re-".to_string(),
            })
        })
        .unwrap();

    assert_eq!(covered_text(&session, id), "Stabilise");
}

#[test]
fn test_edit_inside_range_keeps_proposal() {
    let (mut session, id) = session_with_proposal("most open incidents", PreviewKind::RangeReplace);
    let at = offset_of("open");

    session
        .edit(|doc| {
            doc.apply(Cmd::InsertText {
                at,
                text: "long-".to_string(),
            })
        })
        .unwrap();

    assert_eq!(covered_text(&session, id), "most long-open incidents");
}

#[test]
fn test_partial_deletion_shrinks_range() {
    let (mut session, id) = session_with_proposal("most open incidents", PreviewKind::RangeReplace);
    let start = offset_of("open incidents");

    session
        .edit(|doc| {
            doc.apply(Cmd::DeleteRange {
                range: start..start + "open incidents.".len(),
            })
        })
        .unwrap();

    assert_eq!(covered_text(&session, id), "most ");
}

#[test]
fn test_block_proposal_covers_heading_and_survives_edits_elsewhere() {
    let (mut session, id) = session_with_proposal("Status", PreviewKind::Block);
    assert_eq!(covered_text(&session, id), "## Status");

    session
        .edit(|doc| {
            doc.apply(Cmd::ReplaceRange {
                range: 0..1,
                text: "#".to_string(),
            })
        })
        .unwrap();

    assert_eq!(covered_text(&session, id), "## Status");
}

#[test]
fn test_markers_follow_reprojected_range() {
    let (mut session, id) = session_with_proposal("Book retro", PreviewKind::RangeReplace);

    session
        .edit(|doc| doc.apply(Cmd::DeleteRange { range: 0..20 }))
        .unwrap();

    let end = session.proposal(id).unwrap().normalized.to;
    let markers = session.overlay_markers();
    assert_eq!(markers.len(), 3);
    assert!(markers[1..].iter().all(|m| m.anchor == end));
}

#[test]
fn test_code_span_selection_is_never_split() {
    let (session, id) = session_with_proposal("syn", PreviewKind::RangeReplace);
    assert_eq!(covered_text(&session, id), "`sync`");
}
