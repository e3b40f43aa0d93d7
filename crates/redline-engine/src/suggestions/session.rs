use redline_config::OverlayConfig;

use crate::editing::{HostDocument, Patch};
use crate::suggestions::executor::{self, AcceptOutcome, ApplyError};
use crate::suggestions::normalize::{self, RangeError};
use crate::suggestions::overlay::{self, OverlayMarker};
use crate::suggestions::proposal::{DiffProposal, ProposalDraft, ProposalId};
use crate::suggestions::store::ProposalStore;

/// One editing session: a host document, its proposals and overlay settings.
///
/// Every document change goes through the session so proposals are
/// re-projected before anything can render them. The store is owned here and
/// dies with the session.
///
/// ```rust
/// # use redline_engine::editing::Document;
/// # use redline_engine::{EditingSession, Fragment, PreviewKind, ProposalDraft, SelectionRange};
/// let doc = Document::from_bytes(b"Hello World").unwrap();
/// let mut session = EditingSession::new(doc, Default::default());
///
/// let draft = ProposalDraft::new(
///     PreviewKind::RangeReplace,
///     SelectionRange::new(6, 11),
///     Fragment::text("There"),
/// );
/// let id = session.submit(draft).unwrap();
/// session.on_accept(id).unwrap();
///
/// assert_eq!(session.host().text(), "Hello There");
/// assert!(session.proposals().is_empty());
/// ```
#[derive(Debug)]
pub struct EditingSession<H: HostDocument> {
    host: H,
    store: ProposalStore,
    config: OverlayConfig,
}

impl<H: HostDocument> EditingSession<H> {
    pub fn new(host: H, config: OverlayConfig) -> Self {
        Self {
            host,
            store: ProposalStore::new(),
            config,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Normalize a draft against the current document and register it
    pub fn submit(&mut self, draft: ProposalDraft) -> Option<ProposalId> {
        match self.prepare(draft) {
            Ok(proposal) => self.store.register(proposal),
            Err(err) => {
                log::warn!("refusing suggestion: {err}");
                None
            }
        }
    }

    /// Build the proposal a draft describes without registering it
    pub fn prepare(&self, draft: ProposalDraft) -> Result<DiffProposal, RangeError> {
        let normalized = normalize::normalize(
            draft.selection,
            draft.preview_kind,
            self.host.outline(),
        )?;
        let original = draft
            .original_content
            .unwrap_or_else(|| self.host.slice_fragment(normalized.span()));

        Ok(DiffProposal::new(
            draft.preview_kind,
            draft.selection,
            normalized,
            original,
            draft.suggested_content,
            draft.diff,
        ))
    }

    /// Register a fully formed proposal from the upstream producer
    pub fn register(&mut self, proposal: DiffProposal) -> Option<ProposalId> {
        self.store.register(proposal)
    }

    /// Run a host-side edit and carry every proposal through it
    pub fn edit<E>(&mut self, f: impl FnOnce(&mut H) -> Result<Patch, E>) -> Result<Patch, E> {
        let patch = f(&mut self.host)?;
        self.store.reproject_all(&patch.mapping);
        Ok(patch)
    }

    /// Markers for every pending proposal, recomputed from scratch
    pub fn overlay_markers(&self) -> Vec<OverlayMarker> {
        overlay::build(self.host.outline(), &self.store.list(), &self.config)
    }

    pub fn on_accept(&mut self, id: ProposalId) -> Result<AcceptOutcome, ApplyError> {
        executor::accept(&mut self.store, &mut self.host, id)
    }

    pub fn on_reject(&mut self, id: ProposalId) -> bool {
        executor::reject(&mut self.store, id)
    }

    /// Pending proposals in registration order
    pub fn proposals(&self) -> Vec<&DiffProposal> {
        self.store.list()
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&DiffProposal> {
        self.store.get(id)
    }

    pub fn into_host(self) -> H {
        self.host
    }
}
