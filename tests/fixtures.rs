//! # Fixture Tests
//!
//! Deterministic small trees built through the public API, checked
//! against hand-computed shapes. These pin down the exact rotation
//! behaviour: if a rebalancing rule regresses, the rendered structure
//! changes and the fixture catches it.

use ranktree::RankTree;

/// Builds a tree from the given keys, inserted in order, with unit
/// values.
fn build(keys: &[i32]) -> RankTree<i32, ()> {
	let mut tree = RankTree::new();
	for &k in keys {
		tree.insert(k, ());
	}
	tree.assert_invariants();
	tree
}

/// Collects `(key, depth)` pairs in ascending key order.
fn shape(tree: &RankTree<i32, ()>) -> Vec<(i32, usize)> {
	let mut out = Vec::with_capacity(tree.len());
	let mut at = tree.first();
	while let Some(id) = at {
		out.push((*tree.key(id), tree.depth(id)));
		at = tree.next(id);
	}
	out
}

// ===========================================================================
// Insertion Fixtures
// ===========================================================================

#[test]
fn ascending_insertion_stays_balanced() {
	// 1..=7 ascending forces a single rotation at sizes 3, 5, 6 and 7
	// and ends perfectly balanced.
	let tree = build(&[1, 2, 3, 4, 5, 6, 7]);
	assert_eq!(
		shape(&tree),
		vec![(1, 2), (2, 1), (3, 2), (4, 0), (5, 2), (6, 1), (7, 2)]
	);
}

#[test]
fn descending_insertion_stays_balanced() {
	let tree = build(&[7, 6, 5, 4, 3, 2, 1]);
	assert_eq!(
		shape(&tree),
		vec![(1, 2), (2, 1), (3, 2), (4, 0), (5, 2), (6, 1), (7, 2)]
	);
}

#[test]
fn zigzag_insertion_triggers_double_rotations() {
	// 2, 6, 4 makes the root right-heavy with an inner grandchild; the
	// double rotation must promote 4.
	let tree = build(&[2, 6, 4]);
	assert_eq!(shape(&tree), vec![(2, 1), (4, 0), (6, 1)]);

	// Mirror case.
	let tree = build(&[6, 2, 4]);
	assert_eq!(shape(&tree), vec![(2, 1), (4, 0), (6, 1)]);
}

#[test]
fn double_rotation_with_subtrees() {
	// Inserting 7 overloads the subtree under 4; the double rotation
	// promotes 6 and hands its right child 7 across to 8.
	let tree = build(&[10, 4, 16, 2, 8, 18, 6, 9, 7]);
	assert_eq!(
		shape(&tree),
		vec![
			(2, 3),
			(4, 2),
			(6, 1),
			(7, 3),
			(8, 2),
			(9, 3),
			(10, 0),
			(16, 1),
			(18, 2),
		]
	);
}

// ===========================================================================
// Deletion Fixtures
// ===========================================================================

#[test]
fn leaf_removal_rebalances() {
	// Removing 1 leaves the root right-heavy beyond tolerance; a
	// single rotation promotes 4.
	let mut tree = build(&[2, 1, 4, 3, 5]);
	tree.remove(&1);
	tree.assert_invariants();
	assert_eq!(shape(&tree), vec![(2, 1), (3, 2), (4, 0), (5, 1)]);
}

#[test]
fn single_child_removal_splices() {
	let mut tree = build(&[4, 2, 6, 1]);
	tree.remove(&2);
	tree.assert_invariants();
	assert_eq!(shape(&tree), vec![(1, 1), (4, 0), (6, 1)]);
}

#[test]
fn two_child_removal_uses_predecessor() {
	// Removing the root of 1..=7 must lift its in-order predecessor 3
	// into the root position.
	let mut tree = build(&[1, 2, 3, 4, 5, 6, 7]);
	tree.remove(&4);
	tree.assert_invariants();

	let root = tree.select(tree.rank(&3).unwrap()).unwrap();
	assert_eq!(tree.parent(root), None);
	assert_eq!(*tree.key(root), 3);
	assert_eq!(
		shape(&tree),
		vec![(1, 2), (2, 1), (3, 0), (5, 2), (6, 1), (7, 2)]
	);
}

#[test]
fn removal_propagates_shrink_to_root() {
	// A Fibonacci-shaped tree: removing the deepest leaf shortens a
	// subtree and the fixup must ripple all the way up.
	let mut tree = build(&[5, 3, 8, 2, 4, 7, 9, 1, 6]);
	tree.remove(&9);
	tree.assert_invariants();
	let s = shape(&tree);
	assert_eq!(s.iter().map(|&(k, _)| k).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
	// Height stays logarithmic.
	assert!(s.iter().all(|&(_, d)| d <= 3), "shape too deep: {s:?}");
}

#[test]
fn drain_to_empty_and_back() {
	let mut tree = build(&[4, 2, 6, 1, 3, 5, 7]);
	for k in [4, 1, 7, 3, 5, 2, 6] {
		assert!(tree.remove(&k).is_some());
		tree.assert_invariants();
	}
	assert!(tree.is_empty());
	assert_eq!(tree.first(), None);
	assert_eq!(tree.last(), None);

	tree.insert(42, ());
	assert_eq!(shape(&tree), vec![(42, 0)]);
}

// ===========================================================================
// Rank Fixtures
// ===========================================================================

#[test]
fn ranks_on_fixed_shape() {
	let tree = build(&[50, 30, 70, 20, 40, 60, 80]);
	for (rank, key) in [20, 30, 40, 50, 60, 70, 80].into_iter().enumerate() {
		assert_eq!(tree.rank(&key), Some(rank), "rank of {key}");
		let id = tree.select(rank).unwrap();
		assert_eq!(*tree.key(id), key, "select({rank})");
		let (found, r) = tree.search(&key).unwrap();
		assert_eq!(found, id);
		assert_eq!(r, rank);
	}
	assert_eq!(tree.rank(&55), None);
	assert_eq!(tree.search(&55), None);
}

#[test]
fn dump_renders_fixed_shape() {
	let tree = build(&[2, 1, 3]);
	let dump = tree.dump();
	let lines: Vec<&str> = dump.lines().collect();
	assert_eq!(lines.len(), 3);
	assert!(lines[0].starts_with("\t3"));
	assert!(lines[1].starts_with('2'));
	assert!(lines[2].starts_with("\t1"));
}
