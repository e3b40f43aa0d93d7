//! Suggestion overlay engine.
//!
//! Proposals arrive from an upstream producer, are anchored to a normalized
//! range of the host document and live in the session's [`ProposalStore`]
//! until the user accepts or rejects them, or an edit deletes what they
//! point at.
//!
//! Per document change the order is always:
//! 1. the host commits an edit and returns a [`Patch`](crate::editing::Patch)
//! 2. [`ProposalStore::reproject_all`] carries every proposal through it
//! 3. [`overlay::build`] recomputes all markers from scratch
//!
//! Only [`executor::accept`] writes to the document on the engine's behalf.

pub mod executor;
pub mod normalize;
pub mod overlay;
pub mod preview;
pub mod proposal;
pub mod session;
pub mod store;

pub use executor::{AcceptOutcome, ApplyError};
pub use normalize::{RangeError, normalize};
pub use overlay::{AcceptVerb, MarkerPayload, OverlayMarker};
pub use preview::serialize;
pub use store::ProposalStore;
