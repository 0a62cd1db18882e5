//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree model's invariants.
/// These are independent of payload loading and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("facet identifier must not be blank")]
    BlankIdentifier,

    #[error("facet name must not be blank (identifier: {identifier})")]
    BlankName { identifier: String },

    #[error("unknown facet node: {0}")]
    UnknownNode(String),

    #[error("unknown display item: {0}")]
    UnknownItem(String),

    #[error("node already attached: {0}")]
    AlreadyAttached(String),

    #[error("attaching {child} under {parent} would create a cycle")]
    CycleDetected { parent: String, child: String },

    #[error("cannot add children to {0}: subtree is already attached to a parent")]
    SealedSubtree(String),

    #[error("depth mismatch for {id}: expected {expected}, got {actual}")]
    DepthMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("{operation} is not supported on {kind} item {id}")]
    WrongVariant {
        id: String,
        kind: &'static str,
        operation: &'static str,
    },
}

impl DomainError {
    /// True for the construction-time validation failures of the node factory.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::BlankIdentifier | Self::BlankName { .. })
    }
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
