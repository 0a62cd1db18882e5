//! Builds a facet data tree and its display tree from a raw payload.

use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::domain::display::{DisplayId, DisplayTree};
use crate::domain::error::DomainResult;
use crate::domain::facet::{FacetNodeId, FacetTree};
use crate::domain::payload::CategoryPayload;

/// Identifier of the synthetic display root wrapping all payload roots.
pub const WRAPPING_ROOT_ID: &str = "__all__";

/// Options applied while building.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Label of a synthetic display root grouping all payload roots
    pub root_label: Option<String>,
    /// Collapse every parent at this depth (and thereby everything below)
    pub collapse_depth: Option<usize>,
}

/// Data tree plus its structurally parallel display tree.
#[derive(Debug)]
pub struct Catalog<T> {
    pub facets: FacetTree<T>,
    pub display: DisplayTree,
}

/// Constructs catalogs from payload roots.
#[derive(Debug, Default)]
pub struct FacetTreeBuilder {
    options: BuildOptions,
}

impl FacetTreeBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Builds both trees.
    ///
    /// Display items are created top-down, where depth is known, and attached
    /// in post-order so that every subtree is complete before it is attached
    /// to its parent. Any validation error aborts the whole build.
    #[instrument(level = "debug", skip(self, roots), fields(root_count = roots.len()))]
    pub fn build<T>(&self, roots: Vec<CategoryPayload<T>>) -> DomainResult<Catalog<T>> {
        let mut facets = FacetTree::new();
        let mut display = DisplayTree::new();

        let offset = usize::from(self.options.root_label.is_some());
        let wrapping_root = self
            .options
            .root_label
            .as_deref()
            .map(|label| display.new_parent(WRAPPING_ROOT_ID, label, 0));

        // display item -> pending children in payload order
        let mut pending: HashMap<DisplayId, Vec<DisplayId>> = HashMap::new();
        let mut top_level: Vec<DisplayId> = Vec::new();
        // facet node -> its display item, to mirror duplicate overwrites
        let mut mirrors: HashMap<FacetNodeId, DisplayId> = HashMap::new();

        let mut stack: Vec<(CategoryPayload<T>, Option<FacetNodeId>, Option<DisplayId>, usize)> =
            roots
                .into_iter()
                .rev()
                .map(|root| (root, None, wrapping_root, offset))
                .collect();

        while let Some((payload, facet_parent, display_parent, depth)) = stack.pop() {
            let CategoryPayload {
                identifier,
                name,
                children,
                items,
            } = payload;

            let node = facets.make(facet_parent, &identifier, &name, items)?;
            let replaced = match facet_parent {
                Some(parent) => {
                    let previous = facets.child(parent, &identifier);
                    facets.add_child(parent, node)?;
                    previous
                }
                None => {
                    let previous = facets.root(&identifier);
                    facets.add_root(node)?;
                    previous
                }
            };

            let item = if children.is_empty() {
                display.new_leaf(&identifier, &name, depth)
            } else {
                display.new_parent(&identifier, &name, depth)
            };
            mirrors.insert(node, item);

            let siblings = match display_parent {
                Some(parent) => pending.entry(parent).or_default(),
                None => &mut top_level,
            };
            let stale = replaced.and_then(|old| mirrors.remove(&old));
            match stale.and_then(|old| siblings.iter().position(|s| *s == old)) {
                Some(pos) => siblings[pos] = item,
                None => siblings.push(item),
            }
            if let Some(old) = stale {
                debug!(identifier = %identifier, "duplicate identifier: replacing display item");
                discard_pending(&mut display, &mut pending, old)?;
            }

            for child in children.into_iter().rev() {
                stack.push((child, Some(node), Some(item), depth + 1));
            }
        }

        let display_roots = match wrapping_root {
            Some(root) => vec![root],
            None => top_level,
        };
        for root in display_roots {
            attach_post_order(&mut display, &pending, root)?;
            display.add_root(root)?;
        }

        if let Some(depth) = self.options.collapse_depth {
            collapse_at_depth(&mut display, depth)?;
        }

        let facet_count = facets.len();
        let display_items = display.len();
        info!(facet_count, display_items, "catalog built");
        Ok(Catalog { facets, display })
    }
}

/// Drops a not yet attached display item and every pending item below it.
fn discard_pending(
    display: &mut DisplayTree,
    pending: &mut HashMap<DisplayId, Vec<DisplayId>>,
    item: DisplayId,
) -> DomainResult<()> {
    let mut stack = vec![item];
    while let Some(current) = stack.pop() {
        if let Some(children) = pending.remove(&current) {
            stack.extend(children);
        }
        display.remove_detached(current)?;
    }
    Ok(())
}

/// Attaches every pending child below `root` after its own subtree is done.
fn attach_post_order(
    display: &mut DisplayTree,
    pending: &HashMap<DisplayId, Vec<DisplayId>>,
    root: DisplayId,
) -> DomainResult<()> {
    let mut stack = vec![(root, None::<DisplayId>, false)];
    while let Some((current, parent, visited)) = stack.pop() {
        if visited {
            if let Some(parent) = parent {
                display.add_child(parent, current)?;
            }
            continue;
        }
        stack.push((current, parent, true));
        if let Some(children) = pending.get(&current) {
            for &child in children.iter().rev() {
                stack.push((child, Some(current), false));
            }
        }
    }
    Ok(())
}

fn collapse_at_depth(display: &mut DisplayTree, depth: usize) -> DomainResult<()> {
    let targets: Vec<DisplayId> = display
        .iter()
        .filter(|(_, item)| !item.is_leaf() && item.depth() == depth)
        .map(|(idx, _)| idx)
        .collect();
    debug!(depth, count = targets.len(), "collapsing parents");
    for target in targets {
        display.set_collapsed(target, true)?;
    }
    Ok(())
}
