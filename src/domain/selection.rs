//! Selection aggregates and visible rows, computed by walking the display tree.
//!
//! The tree itself only tracks per-leaf selection; everything here is derived
//! on demand and never cached.

use tracing::instrument;

use crate::domain::display::{DisplayId, DisplayTree};
use crate::domain::error::{DomainError, DomainResult};

/// Tri-state selection of an item with respect to its descendant leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    None,
    Mixed,
    All,
}

impl SelectionState {
    /// Value for the `aria-checked` attribute.
    pub fn aria_checked(self) -> &'static str {
        match self {
            SelectionState::None => "false",
            SelectionState::Mixed => "mixed",
            SelectionState::All => "true",
        }
    }
}

/// (selected, total) leaves at or below `item`.
fn tally(tree: &DisplayTree, item: DisplayId) -> (usize, usize) {
    tree.iter_from(item)
        .filter(|(_, i)| i.is_leaf())
        .fold((0, 0), |(selected, total), (_, i)| {
            (selected + usize::from(i.is_selected()), total + 1)
        })
}

/// Number of selected leaves at or below `item`. Unknown items count zero.
pub fn selected_count(tree: &DisplayTree, item: DisplayId) -> usize {
    tally(tree, item).0
}

/// Selection state of `item`. A parent without leaves is `None`.
pub fn selection_state(tree: &DisplayTree, item: DisplayId) -> SelectionState {
    match tally(tree, item) {
        (0, _) => SelectionState::None,
        (selected, total) if selected == total => SelectionState::All,
        _ => SelectionState::Mixed,
    }
}

/// Sets the selection of every leaf at or below `item`.
///
/// Returns the number of leaves visited.
#[instrument(level = "debug", skip(tree))]
pub fn select_subtree(
    tree: &mut DisplayTree,
    item: DisplayId,
    selected: bool,
) -> DomainResult<usize> {
    if tree.get(item).is_none() {
        return Err(DomainError::UnknownItem(format!("{:?}", item)));
    }
    let leaves: Vec<DisplayId> = tree
        .iter_from(item)
        .filter(|(_, i)| i.is_leaf())
        .map(|(idx, _)| idx)
        .collect();
    for &leaf in &leaves {
        tree.set_selected(leaf, selected)?;
    }
    Ok(leaves.len())
}

/// Items to render, in pre-order. Hidden items and everything below them
/// are skipped.
pub fn visible_rows(tree: &DisplayTree) -> Vec<DisplayId> {
    let mut rows = Vec::new();
    let mut stack: Vec<DisplayId> = tree.roots().iter().rev().copied().collect();

    while let Some(current) = stack.pop() {
        let Some(item) = tree.get(current) else {
            continue;
        };
        if item.is_hidden() {
            continue;
        }
        rows.push(current);
        for &child in item.children().iter().rev() {
            stack.push(child);
        }
    }
    rows
}
