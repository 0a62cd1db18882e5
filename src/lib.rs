//! Faceted category trees.
//!
//! A [`domain::FacetTree`] holds the canonical category hierarchy and its
//! payload data; a structurally parallel [`domain::DisplayTree`] carries the
//! presentation state (selection, collapse, visibility, leaf counts).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    BuildOptions, Catalog, CategoryPayload, DisplayId, DisplayItem, DisplayKind, DisplayTree,
    DomainError, FacetNode, FacetNodeId, FacetTree, FacetTreeBuilder, SelectionState,
};
