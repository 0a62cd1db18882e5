//! Canonical facet data tree.
//!
//! Nodes live in a generational arena; parent and child links are arena
//! indices. A node is owned by exactly one children collection (or by the
//! root collection of the tree) once attached.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};

/// Handle of a node inside a [`FacetTree`].
pub type FacetNodeId = Index;

/// A category node carrying payload elements of type `T`.
#[derive(Debug, Clone)]
pub struct FacetNode<T> {
    identifier: String,
    name: String,
    /// Back-reference only, never an ownership edge
    parent: Option<FacetNodeId>,
    /// Children in insertion order
    children: Vec<FacetNodeId>,
    /// identifier -> child, kept in sync with `children`
    child_index: HashMap<String, FacetNodeId>,
    data: Vec<T>,
    /// Registered in a children collection or as a root
    attached: bool,
    /// Some ancestor on the attached chain, `None` when this node is the top
    /// of its chain. Compressed on lookup.
    anchor: Option<FacetNodeId>,
}

impl<T> FacetNode<T> {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<FacetNodeId> {
        self.parent
    }

    pub fn children(&self) -> &[FacetNodeId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Data attached directly to this node, descendants excluded.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// Arena-backed aggregate holding one or more facet roots in insertion order.
#[derive(Debug)]
pub struct FacetTree<T> {
    arena: Arena<FacetNode<T>>,
    roots: Vec<FacetNodeId>,
    root_index: HashMap<String, FacetNodeId>,
}

impl<T> Default for FacetTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FacetTree<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            root_index: HashMap::new(),
        }
    }

    /// Validating node factory.
    ///
    /// Allocates a new, unattached node. `parent` is recorded as the node's
    /// back-reference but the node is not registered anywhere until
    /// [`FacetTree::add_child`] or [`FacetTree::add_root`] is called.
    ///
    /// # Errors
    /// - `BlankIdentifier` / `BlankName` when either is empty or whitespace only.
    /// - `UnknownNode` when `parent` does not resolve.
    #[instrument(level = "trace", skip(self, data))]
    pub fn make(
        &mut self,
        parent: Option<FacetNodeId>,
        identifier: &str,
        name: &str,
        data: Vec<T>,
    ) -> DomainResult<FacetNodeId> {
        if identifier.trim().is_empty() {
            return Err(DomainError::BlankIdentifier);
        }
        if name.trim().is_empty() {
            return Err(DomainError::BlankName {
                identifier: identifier.to_string(),
            });
        }
        if let Some(parent_idx) = parent {
            if !self.arena.contains(parent_idx) {
                return Err(DomainError::UnknownNode(format!("{:?}", parent_idx)));
            }
        }

        let node = FacetNode {
            identifier: identifier.to_string(),
            name: name.to_string(),
            parent,
            children: Vec::new(),
            child_index: HashMap::new(),
            data,
            attached: false,
            anchor: None,
        };
        Ok(self.arena.insert(node))
    }

    /// Registers `child` under `parent`, keyed by the child's identifier.
    ///
    /// A sibling with the same identifier is silently replaced: the new child
    /// takes its position and the replaced subtree is released from the arena.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: FacetNodeId, child: FacetNodeId) -> DomainResult<()> {
        self.check_attachable(child)?;
        if !self.arena.contains(parent) {
            return Err(DomainError::UnknownNode(format!("{:?}", parent)));
        }
        self.check_no_cycle(parent, child)?;

        let identifier = self.arena[child].identifier.clone();
        let parent_node = &mut self.arena[parent];
        let replaced = match parent_node.child_index.insert(identifier.clone(), child) {
            Some(old) => {
                if let Some(slot) = parent_node.children.iter_mut().find(|c| **c == old) {
                    *slot = child;
                }
                Some(old)
            }
            None => {
                parent_node.children.push(child);
                None
            }
        };

        let child_node = &mut self.arena[child];
        child_node.parent = Some(parent);
        child_node.attached = true;
        child_node.anchor = Some(parent);

        if let Some(old) = replaced {
            debug!("duplicate child identifier {identifier}: replacing previous child");
            self.release_subtree(old);
        }
        Ok(())
    }

    /// Registers `node` as a root, same overwrite policy as [`FacetTree::add_child`].
    #[instrument(level = "trace", skip(self))]
    pub fn add_root(&mut self, node: FacetNodeId) -> DomainResult<()> {
        self.check_attachable(node)?;

        let identifier = self.arena[node].identifier.clone();
        let replaced = match self.root_index.insert(identifier.clone(), node) {
            Some(old) => {
                if let Some(slot) = self.roots.iter_mut().find(|r| **r == old) {
                    *slot = node;
                }
                Some(old)
            }
            None => {
                self.roots.push(node);
                None
            }
        };

        let root_node = &mut self.arena[node];
        root_node.parent = None;
        root_node.attached = true;

        if let Some(old) = replaced {
            debug!("duplicate root identifier {identifier}: replacing previous root");
            self.release_subtree(old);
        }
        Ok(())
    }

    pub fn get(&self, id: FacetNodeId) -> Option<&FacetNode<T>> {
        self.arena.get(id)
    }

    /// Pure lookup of a root by identifier.
    pub fn root(&self, identifier: &str) -> Option<FacetNodeId> {
        self.root_index.get(identifier).copied()
    }

    pub fn roots(&self) -> &[FacetNodeId] {
        &self.roots
    }

    /// Root identifiers in insertion order.
    pub fn root_identifiers(&self) -> Vec<&str> {
        self.roots
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .map(|node| node.identifier.as_str())
            .collect()
    }

    pub fn child(&self, parent: FacetNodeId, identifier: &str) -> Option<FacetNodeId> {
        self.arena
            .get(parent)
            .and_then(|node| node.child_index.get(identifier).copied())
    }

    pub fn children(&self, id: FacetNodeId) -> &[FacetNodeId] {
        self.arena.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn has_children(&self, id: FacetNodeId) -> bool {
        self.arena.get(id).is_some_and(|n| n.has_children())
    }

    pub fn parent(&self, id: FacetNodeId) -> Option<FacetNodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn data(&self, id: FacetNodeId) -> &[T] {
        self.arena.get(id).map(|n| n.data()).unwrap_or(&[])
    }

    /// Pre-order data of the subtree rooted at `id`: own data first, then
    /// each child's flattened data in insertion order.
    ///
    /// Uses an explicit stack; children are pushed in reverse so popping
    /// restores insertion order. Unknown ids yield an empty result.
    #[instrument(level = "trace", skip(self))]
    pub fn flat_data(&self, id: FacetNodeId) -> Vec<&T> {
        let mut result = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.get(current) {
                result.extend(node.data.iter());
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        result
    }

    /// Concatenation of every root's flattened data, in root order.
    #[instrument(level = "trace", skip(self))]
    pub fn flat_data_all(&self) -> Vec<&T> {
        self.roots
            .iter()
            .flat_map(|&root| self.flat_data(root))
            .collect()
    }

    /// Flattened data of several subtrees, looked up by identifier anywhere in
    /// the tree. Unknown identifiers are skipped.
    pub fn flat_data_of(&self, identifiers: &[&str]) -> Vec<&T> {
        identifiers
            .iter()
            .filter_map(|identifier| self.find(identifier))
            .flat_map(|id| self.flat_data(id))
            .collect()
    }

    /// First node with `identifier` in pre-order over all roots.
    pub fn find(&self, identifier: &str) -> Option<FacetNodeId> {
        self.iter()
            .find(|(_, node)| node.identifier == identifier)
            .map(|(idx, _)| idx)
    }

    /// Pre-order iterator over all attached nodes, roots in insertion order.
    pub fn iter(&self) -> FacetIter<'_, T> {
        FacetIter::new(self)
    }

    /// Number of allocated nodes, attached or not.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    fn check_attachable(&self, node: FacetNodeId) -> DomainResult<()> {
        match self.arena.get(node) {
            None => Err(DomainError::UnknownNode(format!("{:?}", node))),
            Some(n) if n.attached => Err(DomainError::AlreadyAttached(n.identifier.clone())),
            Some(_) => Ok(()),
        }
    }

    /// `child` is unattached, so it can only be an ancestor of `parent` by
    /// being the top of `parent`'s chain.
    fn check_no_cycle(&mut self, parent: FacetNodeId, child: FacetNodeId) -> DomainResult<()> {
        if self.chain_top(parent) == child {
            return Err(DomainError::CycleDetected {
                parent: self.arena[parent].identifier.clone(),
                child: self.arena[child].identifier.clone(),
            });
        }
        Ok(())
    }

    /// Topmost node reachable through attached parent links, with path
    /// compression so repeated top-down attaches stay cheap.
    fn chain_top(&mut self, node: FacetNodeId) -> FacetNodeId {
        let mut path = Vec::new();
        let mut top = node;
        while let Some(next) = self.arena.get(top).and_then(|n| n.anchor) {
            path.push(top);
            top = next;
        }
        for idx in path {
            if let Some(n) = self.arena.get_mut(idx) {
                n.anchor = Some(top);
            }
        }
        top
    }

    fn release_subtree(&mut self, root: FacetNodeId) {
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.arena.remove(idx) {
                trace!("released {}", node.identifier);
                stack.extend(node.children);
            }
        }
    }
}

pub struct FacetIter<'a, T> {
    tree: &'a FacetTree<T>,
    stack: Vec<FacetNodeId>,
}

impl<'a, T> FacetIter<'a, T> {
    fn new(tree: &'a FacetTree<T>) -> Self {
        let stack = tree.roots.iter().rev().copied().collect();
        Self { tree, stack }
    }
}

impl<'a, T> Iterator for FacetIter<'a, T> {
    type Item = (FacetNodeId, &'a FacetNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
