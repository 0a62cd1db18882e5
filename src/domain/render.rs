/*
Text rendering of trees via termtree.

Trees are converted bottom-up with an explicit post-order stack, so deep
category hierarchies render without recursion.
 */
use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;

use crate::domain::display::{DisplayItem, DisplayKind, DisplayTree};
use crate::domain::facet::{FacetNode, FacetTree};

/// Rendering switches for display trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_counts: bool,
    pub show_hidden: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_counts: true,
            show_hidden: false,
        }
    }
}

pub trait TreeStringConvert {
    /// One termtree per root.
    fn to_tree_string(&self, options: RenderOptions) -> Vec<Tree<String>>;
}

impl TreeStringConvert for DisplayTree {
    fn to_tree_string(&self, options: RenderOptions) -> Vec<Tree<String>> {
        let visible = |idx: Index| {
            self.get(idx)
                .is_some_and(|item| options.show_hidden || !item.is_hidden())
        };
        self.roots()
            .iter()
            .copied()
            .filter(|&root| visible(root))
            .map(|root| {
                convert_post_order(
                    root,
                    |idx| {
                        self.children(idx)
                            .iter()
                            .copied()
                            .filter(|&c| visible(c))
                            .collect()
                    },
                    |idx| self.get(idx).map(|i| display_label(i, options)).unwrap_or_default(),
                )
            })
            .collect()
    }
}

impl<T> TreeStringConvert for FacetTree<T> {
    fn to_tree_string(&self, _options: RenderOptions) -> Vec<Tree<String>> {
        self.roots()
            .iter()
            .map(|&root| {
                convert_post_order(
                    root,
                    |idx| self.children(idx).to_vec(),
                    |idx| self.get(idx).map(facet_label).unwrap_or_default(),
                )
            })
            .collect()
    }
}

fn display_label(item: &DisplayItem, options: RenderOptions) -> String {
    match item.kind() {
        DisplayKind::Leaf { selected } => {
            format!("[{}] {}", if *selected { "x" } else { " " }, item.label())
        }
        DisplayKind::Parent {
            collapsed,
            leaf_count,
            ..
        } => {
            let marker = if *collapsed { "+" } else { "-" };
            if options.show_counts {
                format!("{marker} {} ({leaf_count})", item.label())
            } else {
                format!("{marker} {}", item.label())
            }
        }
    }
}

fn facet_label<T>(node: &FacetNode<T>) -> String {
    if node.data().is_empty() {
        format!("{} [{}]", node.name(), node.identifier())
    } else {
        format!(
            "{} [{}] ({} items)",
            node.name(),
            node.identifier(),
            node.data().len()
        )
    }
}

fn convert_post_order(
    root: Index,
    children_of: impl Fn(Index) -> Vec<Index>,
    label_of: impl Fn(Index) -> String,
) -> Tree<String> {
    let mut built: HashMap<Index, Tree<String>> = HashMap::new();
    let mut stack = vec![(root, false)];

    while let Some((current, visited)) = stack.pop() {
        let children = children_of(current);
        if visited {
            let leaves: Vec<Tree<String>> = children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(current, Tree::new(label_of(current)).with_leaves(leaves));
        } else {
            stack.push((current, true));
            for &child in children.iter().rev() {
                stack.push((child, false));
            }
        }
    }

    built
        .remove(&root)
        .unwrap_or_else(|| Tree::new(label_of(root)))
}
