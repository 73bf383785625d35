//! # Structural Invariant Tests
//!
//! Seeded randomised churn that revalidates the full set of structural
//! checks after every mutation: parent back-references, subtree
//! cardinalities, balance factors against true heights, and symmetric
//! order. These are slower than the integration suite because they run
//! the checkers O(n) times per workload, so the tree sizes stay modest.

use rand::prelude::*;
use ranktree::RankTree;

fn checked_insert(tree: &mut RankTree<i32, i32>, key: i32, value: i32) {
	tree.insert(key, value);
	tree.check_parent_links().unwrap();
	tree.check_subtree_counts().unwrap();
	tree.assert_invariants();
}

fn checked_remove(tree: &mut RankTree<i32, i32>, key: i32) {
	tree.remove(&key);
	tree.check_parent_links().unwrap();
	tree.check_subtree_counts().unwrap();
	tree.assert_invariants();
}

// ===========================================================================
// Insertion Storms
// ===========================================================================

#[test]
fn invariants_hold_during_sequential_insertion() {
	let mut tree = RankTree::new();
	for i in 0..500 {
		checked_insert(&mut tree, i, i);
	}
	for i in (0..500).rev() {
		checked_insert(&mut tree, -i, i);
	}
	assert_eq!(tree.len(), 1000);
}

#[test]
fn invariants_hold_during_random_insertion() {
	let mut rng = StdRng::seed_from_u64(0xA11);
	let mut tree = RankTree::new();
	for _ in 0..800 {
		let key = rng.random_range(0..2000);
		checked_insert(&mut tree, key, key);
	}
}

// ===========================================================================
// Deletion Storms
// ===========================================================================

#[test]
fn invariants_hold_during_random_deletion() {
	let mut rng = StdRng::seed_from_u64(0xDE1);
	let mut tree = RankTree::new();
	let mut keys: Vec<i32> = (0..600).collect();

	for &k in &keys {
		tree.insert(k, k);
	}
	tree.assert_invariants();

	keys.shuffle(&mut rng);
	for k in keys {
		checked_remove(&mut tree, k);
	}
	assert!(tree.is_empty());
}

#[test]
fn invariants_hold_during_mixed_churn() {
	let mut rng = StdRng::seed_from_u64(0xC0FFEE);
	let mut tree = RankTree::new();

	for step in 0..2000 {
		let key = rng.random_range(0..300);
		if rng.random_bool(0.55) {
			checked_insert(&mut tree, key, step);
		} else {
			checked_remove(&mut tree, key);
		}
	}
}

// ===========================================================================
// Drain Workloads
// ===========================================================================

#[test]
fn drain_by_repeated_minimum_removal() {
	// Keeps removing the current smallest key, which exercises the
	// shrink fixup along the leftmost spine until the tree empties.
	let mut rng = StdRng::seed_from_u64(0x0515);
	let mut tree: RankTree<String, u32> = RankTree::new();

	for _ in 0..40 {
		let key = format!("{:04}", rng.random_range(0..10_000u32));
		// Duplicate keys overwrite in place.
		tree.insert(key, 0);
	}
	tree.assert_invariants();

	let mut drained = Vec::new();
	while let Some(first) = tree.first() {
		let key = tree.key(first).clone();
		assert_eq!(tree.rank(&key), Some(0));
		assert!(tree.remove(&key).is_some());
		tree.check_parent_links().unwrap();
		tree.check_subtree_counts().unwrap();
		tree.assert_invariants();
		drained.push(key);
	}

	assert!(tree.is_empty());
	assert!(drained.windows(2).all(|w| w[0] < w[1]), "drain out of order: {drained:?}");
}

#[test]
fn every_deletion_order_prefix_drains_clean() {
	// For every split point of a duplicate-heavy insertion sequence:
	// delete the first i keys in insertion order (skipping ones a
	// duplicate already removed), then the rest in reverse, validating
	// structure at each step and ending empty.
	let mut rng = StdRng::seed_from_u64(0x4D16);
	let inserted: Vec<String> = (0..40)
		.map(|_| format!("{:04}", rng.random_range(0..30u32)))
		.collect();

	for split in 0..=inserted.len() {
		let mut tree: RankTree<String, u32> = RankTree::new();
		for key in &inserted {
			tree.insert(key.clone(), 0);
		}
		tree.assert_invariants();

		let (prefix, rest) = inserted.split_at(split);
		for key in prefix.iter().chain(rest.iter().rev()) {
			tree.remove(key);
			tree.check_parent_links().unwrap();
			tree.check_subtree_counts().unwrap();
			tree.assert_invariants();
		}
		assert!(tree.is_empty(), "split {split} left {} keys", tree.len());
	}
}

#[test]
fn drain_by_repeated_maximum_removal() {
	let mut tree: RankTree<i32, i32> = (0..200).map(|k| (k, k)).collect();

	while let Some(last) = tree.last() {
		let key = *tree.key(last);
		assert_eq!(tree.rank(&key), Some(tree.len() - 1));
		tree.remove(&key);
		tree.assert_invariants();
	}
	assert!(tree.is_empty());
}

#[test]
fn drain_by_repeated_median_removal() {
	// Always remove the current median, which forces two-child
	// deletions with predecessor relinking almost every step.
	let mut tree: RankTree<i32, i32> = (0..257).map(|k| (k, k)).collect();

	while !tree.is_empty() {
		let id = tree.select(tree.len() / 2).unwrap();
		let key = *tree.key(id);
		assert_eq!(tree.remove(&key), Some(key));
		tree.check_parent_links().unwrap();
		tree.check_subtree_counts().unwrap();
		tree.assert_invariants();
	}
}

// ===========================================================================
// Depth Bound
// ===========================================================================

#[test]
fn height_stays_logarithmic() {
	// A valid height-balanced tree over n keys is at most
	// ~1.44 * log2(n) deep; 2 * log2(n) is a comfortable ceiling.
	let mut rng = StdRng::seed_from_u64(0x1066);
	let mut tree = RankTree::new();
	let mut keys: Vec<i32> = (0..4096).collect();
	keys.shuffle(&mut rng);
	for k in keys {
		tree.insert(k, k);
	}
	tree.assert_invariants();

	let limit = 2 * (tree.len() as f64).log2().ceil() as usize;
	let mut at = tree.first();
	while let Some(id) = at {
		assert!(tree.depth(id) <= limit, "node {:?} too deep", tree.key(id));
		at = tree.next(id);
	}
}
