//! Tests for display tree invariants: depth, leaf counts and collapse cascades

use rstest::rstest;

use facettree::domain::{
    BuildOptions, CategoryPayload, DisplayId, DisplayTree, DomainError, FacetTreeBuilder,
};

/// Deterministic parent array: node `i > 0` hangs below a node `< i`.
fn random_parents(len: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..len)
        .map(|i| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            if i == 0 {
                0
            } else {
                ((state >> 33) as usize) % i
            }
        })
        .collect()
}

/// Payload shaped by a parent array; node 0 is the single root.
fn payload_from_parents(parents: &[usize]) -> CategoryPayload<usize> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); parents.len()];
    for (i, &p) in parents.iter().enumerate().skip(1) {
        children[p].push(i);
    }

    // post-order assembly so each payload owns its finished children
    let mut built: Vec<Option<CategoryPayload<usize>>> = (0..parents.len()).map(|_| None).collect();
    let mut stack = vec![(0usize, false)];
    while let Some((node, visited)) = stack.pop() {
        if visited {
            let kids = children[node]
                .iter()
                .map(|&c| built[c].take().unwrap())
                .collect::<Vec<_>>();
            built[node] = Some(
                CategoryPayload::new(format!("n{node}"), format!("Node {node}"))
                    .with_items(vec![node])
                    .with_children(kids),
            );
            continue;
        }
        stack.push((node, true));
        for &c in children[node].iter().rev() {
            stack.push((c, false));
        }
    }
    built[0].take().unwrap()
}

/// Leaves below `item`, counted by walking the subtree.
fn walked_leaves(tree: &DisplayTree, item: DisplayId) -> usize {
    tree.iter_from(item)
        .filter(|(idx, entry)| *idx != item && entry.is_leaf())
        .count()
}

// ============================================================
// Leaf counts and depth
// ============================================================

#[rstest]
#[case(1, 7)]
#[case(12, 42)]
#[case(200, 1)]
#[case(500, 2024)]
fn given_random_shape_when_building_then_leaf_counts_match_walk(
    #[case] len: usize,
    #[case] seed: u64,
) {
    // Arrange
    let payload = payload_from_parents(&random_parents(len, seed));

    // Act
    let catalog = FacetTreeBuilder::default().build(vec![payload]).unwrap();

    // Assert
    let display = &catalog.display;
    assert_eq!(display.len(), len);
    for (idx, item) in display.iter() {
        if let Some(count) = item.leaf_count() {
            assert_eq!(count, walked_leaves(display, idx), "item {}", item.id());
        }
        match item.parent() {
            Some(parent) => {
                assert_eq!(item.depth(), display.get(parent).unwrap().depth() + 1);
            }
            None => assert_eq!(item.depth(), 0),
        }
    }
}

#[test]
fn given_wrapping_root_when_building_then_depths_shift_by_one() {
    // Arrange
    let builder = FacetTreeBuilder::new(BuildOptions {
        root_label: Some("All".to_string()),
        collapse_depth: None,
    });
    let payload = payload_from_parents(&random_parents(30, 3));

    // Act
    let catalog = builder.build(vec![payload]).unwrap();

    // Assert
    let display = &catalog.display;
    let n0 = display.find("n0").unwrap();
    assert_eq!(display.get(n0).unwrap().depth(), 1);
    let root = display.roots()[0];
    assert_eq!(
        display.get(root).unwrap().leaf_count(),
        display.get(n0).unwrap().leaf_count()
    );
}

#[test]
fn given_parent_without_children_when_created_then_leaf_count_is_zero() {
    let mut tree = DisplayTree::new();

    let empty = tree.new_parent("empty", "Empty", 0);

    assert_eq!(tree.get(empty).unwrap().leaf_count(), Some(0));
    assert!(tree.children(empty).is_empty());
}

#[test]
fn given_deep_chain_when_built_bottom_up_then_counts_and_cascade_work() {
    // Arrange: a 10_000 level chain ending in one leaf
    const DEPTH: usize = 10_000;
    let mut tree = DisplayTree::new();
    let mut below = tree.new_leaf("leaf", "Leaf", DEPTH);
    for depth in (0..DEPTH).rev() {
        let parent = tree.new_parent(&format!("p{depth}"), "P", depth);
        tree.add_child(parent, below).unwrap();
        below = parent;
    }
    tree.add_root(below).unwrap();

    // Act
    tree.set_collapsed(below, true).unwrap();

    // Assert
    assert_eq!(tree.get(below).unwrap().leaf_count(), Some(1));
    let leaf = tree.find("leaf").unwrap();
    assert!(tree.get(leaf).unwrap().is_hidden());
    assert_eq!(tree.iter().count(), DEPTH + 1);
}

#[test]
fn given_late_child_for_attached_parent_when_adding_then_rejected_and_count_unchanged() {
    // Arrange
    let mut tree = DisplayTree::new();
    let root = tree.new_parent("root", "Root", 0);
    let mid = tree.new_parent("mid", "Mid", 1);
    let leaf = tree.new_leaf("l", "L", 2);
    tree.add_child(mid, leaf).unwrap();
    tree.add_child(root, mid).unwrap();

    // Act
    let late = tree.new_leaf("late", "Late", 2);
    let result = tree.add_child(mid, late);

    // Assert
    assert_eq!(result, Err(DomainError::SealedSubtree("mid".to_string())));
    assert_eq!(tree.get(root).unwrap().leaf_count(), Some(1));
    assert_eq!(tree.get(mid).unwrap().leaf_count(), Some(1));
}

// ============================================================
// Collapse cascade
// ============================================================

// r
// ├── a
// │   ├── a1
// │   └── b
// │       └── b1
// └── c
fn nested_tree() -> DisplayTree {
    let mut tree = DisplayTree::new();
    let r = tree.new_parent("r", "R", 0);
    let a = tree.new_parent("a", "A", 1);
    let a1 = tree.new_leaf("a1", "A1", 2);
    let b = tree.new_parent("b", "B", 2);
    let b1 = tree.new_leaf("b1", "B1", 3);
    let c = tree.new_leaf("c", "C", 1);
    tree.add_child(b, b1).unwrap();
    tree.add_child(a, a1).unwrap();
    tree.add_child(a, b).unwrap();
    tree.add_child(r, a).unwrap();
    tree.add_child(r, c).unwrap();
    tree.add_root(r).unwrap();
    tree
}

fn item(tree: &DisplayTree, id: &str) -> DisplayId {
    tree.find(id).unwrap()
}

#[test]
fn given_expanded_tree_when_collapsing_root_then_every_descendant_hidden_and_collapsed() {
    // Arrange
    let mut tree = nested_tree();
    let r = item(&tree, "r");

    // Act
    tree.set_collapsed(r, true).unwrap();

    // Assert
    for (idx, entry) in tree.iter() {
        if idx == r {
            assert!(!entry.is_hidden());
            assert!(entry.is_collapsed());
            continue;
        }
        assert!(entry.is_hidden(), "{} should be hidden", entry.id());
        if !entry.is_leaf() {
            assert!(entry.is_collapsed(), "{} should be collapsed", entry.id());
        }
    }
}

#[test]
fn given_collapsed_nested_subtree_when_expanding_ancestor_then_subtree_force_expanded() {
    // Arrange
    let mut tree = nested_tree();
    let r = item(&tree, "r");
    let b = item(&tree, "b");
    tree.set_collapsed(b, true).unwrap();
    assert!(tree.get(item(&tree, "b1")).unwrap().is_hidden());

    // Act
    tree.set_collapsed(r, false).unwrap();

    // Assert
    assert!(!tree.get(b).unwrap().is_collapsed());
    assert!(tree.iter().all(|(_, entry)| !entry.is_hidden()));
}

#[test]
fn given_collapsed_child_when_collapsing_parent_again_then_state_is_uniform() {
    let mut tree = nested_tree();
    let a = item(&tree, "a");
    let b = item(&tree, "b");
    tree.set_collapsed(b, false).unwrap();

    tree.set_collapsed(a, true).unwrap();

    assert!(tree.get(b).unwrap().is_collapsed());
    assert!(tree.get(item(&tree, "b1")).unwrap().is_hidden());
    assert!(!tree.get(item(&tree, "c")).unwrap().is_hidden());
}

#[test]
fn given_leaf_when_collapsing_then_wrong_variant() {
    let mut tree = nested_tree();
    let leaf = item(&tree, "c");

    let err = tree.set_collapsed(leaf, true).unwrap_err();

    assert!(matches!(
        err,
        DomainError::WrongVariant {
            operation: "set_collapsed",
            ..
        }
    ));
}

#[test]
fn given_deep_payload_chain_when_building_then_completes_with_exact_counts() {
    // Arrange: 50_000 nested categories, built inside-out without recursion
    const DEPTH: usize = 50_000;
    let mut payload = CategoryPayload::new("leaf", "Leaf").with_items(vec![DEPTH]);
    for level in (0..DEPTH).rev() {
        payload = CategoryPayload::new(format!("c{level}"), "Category")
            .with_items(vec![level])
            .with_children(vec![payload]);
    }

    // Act
    let catalog = FacetTreeBuilder::default().build(vec![payload]).unwrap();

    // Assert
    let display = &catalog.display;
    let top = display.roots()[0];
    assert_eq!(display.get(top).unwrap().leaf_count(), Some(1));
    assert_eq!(display.len(), DEPTH + 1);
    let root = catalog.facets.root("c0").unwrap();
    assert_eq!(catalog.facets.flat_data(root).len(), DEPTH + 1);
}
