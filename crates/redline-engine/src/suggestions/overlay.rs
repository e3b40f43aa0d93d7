use redline_config::OverlayConfig;

use crate::content::ContentNode;
use crate::editing::Outline;
use crate::position::{Position, Span};
use crate::suggestions::preview::serialize_with_indent;
use crate::suggestions::proposal::{DiffProposal, PreviewKind, ProposalId};

/// Label of the confirm control on a proposal's action marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptVerb {
    /// Range replacements are accepted after reading the before/after text
    Accept,
    /// Block suggestions are applied over the highlighted block
    Apply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerPayload {
    /// Content the proposal would remove
    Highlight { span: Span },
    /// Literal text a block proposal inserts
    InsertPreview { text: String },
    /// Flattened before/after panes of a range replacement
    ReplacePreview { before: String, after: String },
    /// Accept/apply and reject controls
    Actions { verb: AcceptVerb },
}

/// Transient render data for one proposal; rebuilt on every pass, never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayMarker {
    pub proposal: ProposalId,
    pub anchor: Position,
    pub payload: MarkerPayload,
}

/// Build the markers for `proposals` against the current outline.
///
/// Proposals are visited in the order given (registration order) and each
/// contributes a highlight, at most one preview and an action marker. A
/// proposal whose clamped range is empty is skipped for this pass only.
pub fn build(
    outline: &Outline,
    proposals: &[&DiffProposal],
    config: &OverlayConfig,
) -> Vec<OverlayMarker> {
    let size = outline.size();
    let mut markers = Vec::with_capacity(proposals.len() * 3);

    for proposal in proposals {
        let span = proposal.normalized.span().clamp_to(size);
        if span.is_empty() {
            log::debug!(
                "skipping proposal {} this pass: range {}..{} is degenerate in a document of {size}",
                proposal.id,
                proposal.normalized.from,
                proposal.normalized.to
            );
            continue;
        }
        let anchor = span.end;
        let marker = |payload| OverlayMarker {
            proposal: proposal.id,
            anchor,
            payload,
        };

        let interior = outline.interior(span);
        let highlight = if interior.is_empty() { span } else { interior };
        markers.push(OverlayMarker {
            anchor: highlight.start,
            ..marker(MarkerPayload::Highlight { span: highlight })
        });

        let verb = match proposal.preview_kind {
            PreviewKind::RangeReplace => {
                markers.push(marker(MarkerPayload::ReplacePreview {
                    before: pane(proposal.original_content.nodes(), config),
                    after: pane(proposal.suggested_content.nodes(), config),
                }));
                AcceptVerb::Accept
            }
            PreviewKind::Block => {
                if let Some(text) = proposal.first_insertion() {
                    markers.push(marker(MarkerPayload::InsertPreview {
                        text: text.to_string(),
                    }));
                }
                AcceptVerb::Apply
            }
        };

        markers.push(marker(MarkerPayload::Actions { verb }));
    }

    markers
}

fn pane(nodes: &[ContentNode], config: &OverlayConfig) -> String {
    let text = serialize_with_indent(nodes, &config.indent_unit);
    truncate_chars(text, config.preview_char_budget, &config.truncation_marker)
}

/// Keep at most `budget` characters, marking the cut
fn truncate_chars(mut text: String, budget: usize, marker: &str) -> String {
    if let Some((cut, _)) = text.char_indices().nth(budget) {
        text.truncate(cut);
        text.push_str(marker);
    }
    text
}
