/*!
 * # Editing Core
 *
 * The host side of the suggestion engine: the document being edited and the
 * position bookkeeping that lets proposals follow it.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The reference [`Document`] stores the whole text in one `xi_rope::Rope`
 * - Every edit compiles to a **Delta** and lands in one step (no partial edits)
 *
 * ### 2. Position Mapping
 * - Each committed edit yields a [`Patch`] carrying a [`Mapping`]
 * - [`PositionMapper`] translates old positions into the new document, or
 *   reports that they sat inside deleted content
 *
 * ### 3. Outline
 * - [`Outline`] indexes block spans, their inline content extents and atomic
 *   inline spans, re-derived after every edit
 *
 * ### 4. Host Contract
 * - [`HostDocument`] is everything the suggestion engine needs from an editor;
 *   other editors implement it instead of using [`Document`]
 *
 * ## Module Structure
 *
 * - **`document`**: reference `Document` over xi-rope
 * - **`commands`**: `Cmd` enum and delta compilation for host-side edits
 * - **`mapping`**: `Mapping`, `StepMap` and the `PositionMapper` trait
 * - **`outline`**: structural index used for range normalization
 * - **`host`**: the `HostDocument` contract and `ReplaceError`
 * - **`patch`**: change notification returned by every committed edit
 */

pub mod commands;
pub mod document;
pub mod host;
pub mod mapping;
pub mod outline;
pub mod patch;

pub use commands::{Cmd, EditError};
pub use document::Document;
pub use host::{HostDocument, ReplaceError};
pub use mapping::{Assoc, MapResult, Mapping, PositionMapper, StepMap};
pub use outline::{BlockKind, Outline, OutlineBlock};
pub use patch::Patch;
