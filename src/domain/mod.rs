//! Domain layer: facet trees, display state and their invariants
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod display;
pub mod error;
pub mod facet;
pub mod payload;
pub mod render;
pub mod selection;

pub use builder::{BuildOptions, Catalog, FacetTreeBuilder, WRAPPING_ROOT_ID};
pub use display::{DisplayId, DisplayItem, DisplayKind, DisplayTree};
pub use error::{DomainError, DomainResult};
pub use facet::{FacetNode, FacetNodeId, FacetTree};
pub use payload::{CategoryPayload, PayloadDocument};
pub use render::{RenderOptions, TreeStringConvert};
pub use selection::{select_subtree, selected_count, selection_state, visible_rows, SelectionState};
