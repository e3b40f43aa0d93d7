pub mod content;
pub mod editing;
pub mod position;
pub mod suggestions;

// Re-export key types for easier usage
pub use content::{ContentError, ContentNode, Fragment};
pub use editing::{Document, HostDocument, Mapping, Patch, PositionMapper, ReplaceError};
pub use position::{Position, Span};
pub use suggestions::{proposal::*, session::*};
pub use suggestions::{
    AcceptOutcome, AcceptVerb, ApplyError, MarkerPayload, OverlayMarker, ProposalStore, RangeError,
};

pub use redline_config::OverlayConfig;
