//! Presentation-state tree mirroring a facet tree.
//!
//! Items are either leaves (selectable) or parents (collapsible, counted).
//! `leaf_count` is maintained incrementally when a child is attached, so a
//! child's subtree must be complete before it is attached. This is enforced:
//! once an item has a parent it is sealed and cannot receive children.

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// Handle of an item inside a [`DisplayTree`].
pub type DisplayId = Index;

/// Variant-specific presentation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayKind {
    Leaf {
        selected: bool,
    },
    Parent {
        collapsed: bool,
        /// Descendant leaves, accumulated at attach time
        leaf_count: usize,
        children: Vec<DisplayId>,
    },
}

impl DisplayKind {
    fn name(&self) -> &'static str {
        match self {
            DisplayKind::Leaf { .. } => "leaf",
            DisplayKind::Parent { .. } => "parent",
        }
    }
}

/// UI-state node for one facet.
#[derive(Debug, Clone)]
pub struct DisplayItem {
    id: String,
    label: String,
    depth: usize,
    hidden: bool,
    parent: Option<DisplayId>,
    /// Attached as a root or under a parent
    attached: bool,
    kind: DisplayKind,
}

impl DisplayItem {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn parent(&self) -> Option<DisplayId> {
        self.parent
    }

    pub fn kind(&self) -> &DisplayKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, DisplayKind::Leaf { .. })
    }

    /// Selection flag of a leaf; parents are never selected themselves.
    pub fn is_selected(&self) -> bool {
        matches!(self.kind, DisplayKind::Leaf { selected: true })
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self.kind, DisplayKind::Parent { collapsed: true, .. })
    }

    /// Aggregate leaf count of a parent, `None` for leaves.
    pub fn leaf_count(&self) -> Option<usize> {
        match &self.kind {
            DisplayKind::Parent { leaf_count, .. } => Some(*leaf_count),
            DisplayKind::Leaf { .. } => None,
        }
    }

    pub fn children(&self) -> &[DisplayId] {
        match &self.kind {
            DisplayKind::Parent { children, .. } => children,
            DisplayKind::Leaf { .. } => &[],
        }
    }

    /// Leaves this item contributes to its parent's count.
    fn leaf_contribution(&self) -> usize {
        match &self.kind {
            DisplayKind::Parent { leaf_count, .. } => *leaf_count,
            DisplayKind::Leaf { .. } => 1,
        }
    }

    fn wrong_variant(&self, operation: &'static str) -> DomainError {
        DomainError::WrongVariant {
            id: self.id.clone(),
            kind: self.kind.name(),
            operation,
        }
    }
}

/// Arena-backed display tree with ordered roots.
#[derive(Debug, Default)]
pub struct DisplayTree {
    arena: Arena<DisplayItem>,
    roots: Vec<DisplayId>,
}

impl DisplayTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_leaf(&mut self, id: &str, label: &str, depth: usize) -> DisplayId {
        self.insert(id, label, depth, DisplayKind::Leaf { selected: false })
    }

    pub fn new_parent(&mut self, id: &str, label: &str, depth: usize) -> DisplayId {
        self.insert(
            id,
            label,
            depth,
            DisplayKind::Parent {
                collapsed: false,
                leaf_count: 0,
                children: Vec::new(),
            },
        )
    }

    fn insert(&mut self, id: &str, label: &str, depth: usize, kind: DisplayKind) -> DisplayId {
        self.arena.insert(DisplayItem {
            id: id.to_string(),
            label: label.to_string(),
            depth,
            hidden: false,
            parent: None,
            attached: false,
            kind,
        })
    }

    /// Appends `child` to `parent`, sets the back-reference and adds the
    /// child's leaf contribution to the parent's count.
    ///
    /// # Errors
    /// - `AlreadyAttached` when `child` already has a parent or is a root.
    /// - `WrongVariant` when `parent` is a leaf.
    /// - `SealedSubtree` when `parent` is itself already attached to a parent.
    /// - `DepthMismatch` when `child.depth != parent.depth + 1`.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: DisplayId, child: DisplayId) -> DomainResult<()> {
        let child_item = self.item(child)?;
        if child_item.attached {
            return Err(DomainError::AlreadyAttached(child_item.id.clone()));
        }
        let contribution = child_item.leaf_contribution();
        let child_depth = child_item.depth;

        let parent_item = self.item(parent)?;
        if parent_item.is_leaf() {
            return Err(parent_item.wrong_variant("add_child"));
        }
        if parent_item.parent.is_some() {
            return Err(DomainError::SealedSubtree(parent_item.id.clone()));
        }
        if child_depth != parent_item.depth + 1 {
            return Err(DomainError::DepthMismatch {
                id: self.arena[child].id.clone(),
                expected: parent_item.depth + 1,
                actual: child_depth,
            });
        }

        if let DisplayKind::Parent {
            leaf_count,
            children,
            ..
        } = &mut self.arena[parent].kind
        {
            children.push(child);
            *leaf_count += contribution;
        }

        let child_item = &mut self.arena[child];
        child_item.parent = Some(parent);
        child_item.attached = true;
        Ok(())
    }

    /// Registers a depth-0 item as a root.
    #[instrument(level = "trace", skip(self))]
    pub fn add_root(&mut self, item: DisplayId) -> DomainResult<()> {
        let root = self.item(item)?;
        if root.attached {
            return Err(DomainError::AlreadyAttached(root.id.clone()));
        }
        if root.depth != 0 {
            return Err(DomainError::DepthMismatch {
                id: root.id.clone(),
                expected: 0,
                actual: root.depth,
            });
        }
        self.arena[item].attached = true;
        self.roots.push(item);
        Ok(())
    }

    /// Drops an item that was never attached, returning it.
    ///
    /// # Errors
    /// `AlreadyAttached` when the item is a root or has a parent.
    pub fn remove_detached(&mut self, item: DisplayId) -> DomainResult<DisplayItem> {
        let target = self.item(item)?;
        if target.attached {
            return Err(DomainError::AlreadyAttached(target.id.clone()));
        }
        self.arena
            .remove(item)
            .ok_or_else(|| DomainError::UnknownItem(format!("{:?}", item)))
    }

    /// Unconditional visibility setter, no cascade.
    pub fn set_hidden(&mut self, item: DisplayId, hidden: bool) -> DomainResult<()> {
        self.item_mut(item)?.hidden = hidden;
        Ok(())
    }

    /// Unconditional selection setter for a leaf, no cascade.
    pub fn set_selected(&mut self, item: DisplayId, selected: bool) -> DomainResult<()> {
        let leaf = self.item_mut(item)?;
        if let DisplayKind::Leaf { selected: flag } = &mut leaf.kind {
            *flag = selected;
            return Ok(());
        }
        Err(leaf.wrong_variant("set_selected"))
    }

    /// Collapses or expands a parent and cascades to the whole subtree.
    ///
    /// Every direct child gets `hidden = collapsed`; every descendant parent
    /// is set to the same collapsed state, whatever it was before. Expanding
    /// an ancestor therefore force-expands all nested subtrees.
    #[instrument(level = "debug", skip(self))]
    pub fn set_collapsed(&mut self, item: DisplayId, collapsed: bool) -> DomainResult<()> {
        let target = self.item(item)?;
        if target.is_leaf() {
            return Err(target.wrong_variant("set_collapsed"));
        }

        let mut stack = vec![item];
        let mut touched = 0usize;
        while let Some(current) = stack.pop() {
            let children = match &mut self.arena[current].kind {
                DisplayKind::Parent {
                    collapsed: flag,
                    children,
                    ..
                } => {
                    *flag = collapsed;
                    children.clone()
                }
                DisplayKind::Leaf { .. } => continue,
            };
            for child in children {
                let child_item = &mut self.arena[child];
                child_item.hidden = collapsed;
                touched += 1;
                if !child_item.is_leaf() {
                    stack.push(child);
                }
            }
        }
        debug!(collapsed, touched, "cascade complete");
        Ok(())
    }

    pub fn get(&self, item: DisplayId) -> Option<&DisplayItem> {
        self.arena.get(item)
    }

    pub fn roots(&self) -> &[DisplayId] {
        &self.roots
    }

    pub fn parent(&self, item: DisplayId) -> Option<DisplayId> {
        self.arena.get(item).and_then(|i| i.parent)
    }

    pub fn children(&self, item: DisplayId) -> &[DisplayId] {
        self.arena.get(item).map(|i| i.children()).unwrap_or(&[])
    }

    /// First item with `id` in pre-order over all roots.
    pub fn find(&self, id: &str) -> Option<DisplayId> {
        self.iter().find(|(_, item)| item.id == id).map(|(idx, _)| idx)
    }

    /// Pre-order iterator over all attached items.
    pub fn iter(&self) -> DisplayIter<'_> {
        DisplayIter::new(self, self.roots.clone())
    }

    /// Pre-order iterator over the subtree rooted at `item`, `item` included.
    pub fn iter_from(&self, item: DisplayId) -> DisplayIter<'_> {
        DisplayIter::new(self, vec![item])
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    fn item(&self, item: DisplayId) -> DomainResult<&DisplayItem> {
        self.arena
            .get(item)
            .ok_or_else(|| DomainError::UnknownItem(format!("{:?}", item)))
    }

    fn item_mut(&mut self, item: DisplayId) -> DomainResult<&mut DisplayItem> {
        self.arena
            .get_mut(item)
            .ok_or_else(|| DomainError::UnknownItem(format!("{:?}", item)))
    }
}

pub struct DisplayIter<'a> {
    tree: &'a DisplayTree,
    stack: Vec<DisplayId>,
}

impl<'a> DisplayIter<'a> {
    fn new(tree: &'a DisplayTree, mut start: Vec<DisplayId>) -> Self {
        start.reverse();
        Self { tree, stack: start }
    }
}

impl<'a> Iterator for DisplayIter<'a> {
    type Item = (DisplayId, &'a DisplayItem);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(item) = self.tree.arena.get(current_idx) {
                for &child in item.children().iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, item));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // root
    // ├── a
    // │   ├── a1
    // │   └── a2
    // └── b
    fn small_tree() -> (DisplayTree, DisplayId, DisplayId) {
        let mut tree = DisplayTree::new();
        let root = tree.new_parent("root", "Root", 0);
        let a = tree.new_parent("a", "A", 1);
        let a1 = tree.new_leaf("a1", "A1", 2);
        let a2 = tree.new_leaf("a2", "A2", 2);
        let b = tree.new_leaf("b", "B", 1);
        tree.add_child(a, a1).unwrap();
        tree.add_child(a, a2).unwrap();
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_root(root).unwrap();
        (tree, root, a)
    }

    #[test]
    fn leaf_count_accumulates_bottom_up() {
        let (tree, root, a) = small_tree();
        assert_eq!(tree.get(a).unwrap().leaf_count(), Some(2));
        assert_eq!(tree.get(root).unwrap().leaf_count(), Some(3));
    }

    #[test]
    fn attached_item_is_sealed() {
        let (mut tree, _, a) = small_tree();
        let late = tree.new_leaf("a3", "A3", 2);
        assert_eq!(
            tree.add_child(a, late),
            Err(DomainError::SealedSubtree("a".to_string()))
        );
        assert_eq!(tree.get(a).unwrap().leaf_count(), Some(2));
    }

    #[test]
    fn depth_must_follow_parent() {
        let mut tree = DisplayTree::new();
        let root = tree.new_parent("root", "Root", 0);
        let wrong = tree.new_leaf("x", "X", 2);
        assert!(matches!(
            tree.add_child(root, wrong),
            Err(DomainError::DepthMismatch {
                expected: 1,
                actual: 2,
                ..
            })
        ));
        let nested = tree.new_parent("n", "N", 1);
        assert!(matches!(
            tree.add_root(nested),
            Err(DomainError::DepthMismatch { expected: 0, .. })
        ));
    }

    #[test]
    fn second_attach_is_rejected() {
        let (mut tree, root, a) = small_tree();
        let other = tree.new_parent("other", "Other", 0);
        assert!(matches!(
            tree.add_child(other, a),
            Err(DomainError::AlreadyAttached(_))
        ));
        assert!(matches!(
            tree.add_root(root),
            Err(DomainError::AlreadyAttached(_))
        ));
    }

    #[test]
    fn variant_specific_operations_reject_other_variant() {
        let (mut tree, root, a) = small_tree();
        let leaf = tree.children(a)[0];
        assert!(matches!(
            tree.set_collapsed(leaf, true),
            Err(DomainError::WrongVariant { kind: "leaf", .. })
        ));
        assert!(matches!(
            tree.set_selected(root, true),
            Err(DomainError::WrongVariant { kind: "parent", .. })
        ));
        let orphan = tree.new_leaf("o", "O", 1);
        assert!(matches!(
            tree.add_child(leaf, orphan),
            Err(DomainError::WrongVariant { .. })
        ));
    }

    #[test]
    fn set_hidden_does_not_cascade() {
        let (mut tree, _, a) = small_tree();
        tree.set_hidden(a, true).unwrap();
        assert!(tree.get(a).unwrap().is_hidden());
        assert!(tree
            .children(a)
            .iter()
            .all(|&c| !tree.get(c).unwrap().is_hidden()));
    }

    #[test]
    fn set_selected_has_no_count_side_effect() {
        let (mut tree, root, a) = small_tree();
        let leaf = tree.children(a)[0];
        tree.set_selected(leaf, true).unwrap();
        assert!(tree.get(leaf).unwrap().is_selected());
        assert_eq!(tree.get(root).unwrap().leaf_count(), Some(3));
    }

    #[test]
    fn iter_is_preorder() {
        let (tree, _, _) = small_tree();
        let ids: Vec<&str> = tree.iter().map(|(_, item)| item.id()).collect();
        assert_eq!(ids, vec!["root", "a", "a1", "a2", "b"]);
        assert!(tree.find("a2").is_some());
        assert!(tree.find("zz").is_none());
    }
}
