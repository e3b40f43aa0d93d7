//! Proposals delivered as JSON by the upstream producer

use pretty_assertions::assert_eq;
use redline_engine::editing::Document;
use redline_engine::{
    ContentNode, DiffProposal, EditingSession, Fragment, MarkerPayload, NormalizedRange,
    OverlayConfig, PreviewKind, ProposalDraft, ProposalStatus, SegmentKind, SelectionRange,
};
use serde_json::json;

#[test]
fn test_draft_from_json_is_normalized_and_previewed() {
    let draft: ProposalDraft = serde_json::from_value(json!({
        "preview_kind": "range_replace",
        "selection": {"raw_from": 0, "raw_to": 11},
        "suggested_content": [
            {"type": "ordered_list", "start": 3, "children": [
                {"type": "list_item", "children": [{"type": "paragraph", "children": [{"type": "text", "text": "Alpha"}]}]},
                {"type": "list_item", "children": [{"type": "paragraph", "children": [{"type": "text", "text": "Beta"}]}]}
            ]}
        ],
        "diff": [
            {"kind": "delete", "text": "Hello World"},
            {"kind": "insert", "text": "3. Alpha\n4. Beta"}
        ]
    }))
    .unwrap();
    assert_eq!(draft.diff[1].kind, SegmentKind::Insert);

    let mut session = EditingSession::new(
        Document::from_bytes(b"Hello World\n").unwrap(),
        OverlayConfig::default(),
    );
    let id = session.submit(draft).unwrap();

    let markers = session.overlay_markers();
    assert_eq!(
        markers[1].payload,
        MarkerPayload::ReplacePreview {
            before: "Hello World".to_string(),
            after: "3. Alpha\n4. Beta".to_string(),
        }
    );

    session.on_accept(id).unwrap();
    assert_eq!(session.host().text(), "3. Alpha\n4. Beta\n");
}

#[test]
fn test_full_proposal_round_trips_through_json() {
    let proposal = DiffProposal::new(
        PreviewKind::Block,
        SelectionRange::new(2, 4),
        NormalizedRange::new(0, 7),
        Fragment::new(vec![ContentNode::heading(1, "Title")]),
        Fragment::new(vec![ContentNode::heading(1, "Better title")]),
        vec![],
    );

    let value = serde_json::to_value(&proposal).unwrap();
    assert_eq!(value["preview_kind"], json!("block"));
    assert_eq!(value["status"], json!("pending"));
    assert_eq!(value["normalized"], json!({"from": 0, "to": 7}));
    assert_eq!(value["id"], json!(proposal.id.to_string()));

    let back: DiffProposal = serde_json::from_value(value).unwrap();
    assert_eq!(back, proposal);
    assert_eq!(back.status, ProposalStatus::Pending);
}

#[test]
fn test_resolved_proposal_from_producer_is_refused() {
    let mut proposal = DiffProposal::new(
        PreviewKind::RangeReplace,
        SelectionRange::new(0, 5),
        NormalizedRange::new(0, 5),
        Fragment::text("Hello"),
        Fragment::text("Howdy"),
        vec![],
    );
    proposal.status = ProposalStatus::Accepted;

    let mut session = EditingSession::new(
        Document::from_bytes(b"Hello").unwrap(),
        OverlayConfig::default(),
    );

    assert_eq!(session.register(proposal), None);
    assert!(session.overlay_markers().is_empty());
}
