//! Invariant-violation errors reported by the consistency checkers.
//!
//! The tree has no user-facing error surface: absent keys, out-of-range
//! ranks and exhausted iterators are all ordinary `Option::None` outcomes.
//! The only error type in the crate describes *corruption* — a state that a
//! correct tree can never reach — and is produced exclusively by the
//! diagnostic walks in [`RankTree::check_parent_links`] and
//! [`RankTree::check_subtree_counts`].
//!
//! Production code paths never construct these errors. If a checker does
//! report one, the tree's bookkeeping has been damaged (for example by
//! misuse of a stale [`NodeId`] handle) and continuing to use the index
//! risks silent data loss; callers should treat the condition as fatal.
//!
//! [`RankTree::check_parent_links`]: crate::RankTree::check_parent_links
//! [`RankTree::check_subtree_counts`]: crate::RankTree::check_subtree_counts
//! [`NodeId`]: crate::NodeId

use thiserror::Error;

/// Structural corruption detected by a consistency check.
///
/// Node positions are reported as zero-based slot indices so that a failure
/// message can be correlated with [`RankTree::dump`](crate::RankTree::dump)
/// output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorruptError {
	/// A node's `up` link does not point at its actual parent.
	#[error("node {node} stores parent {stored:?} but its actual parent is {actual:?}")]
	ParentMismatch {
		/// Slot index of the offending node.
		node: u32,
		/// The parent slot recorded in the node, if any.
		stored: Option<u32>,
		/// The parent slot the node is actually linked under, if any.
		actual: Option<u32>,
	},

	/// A stored subtree cardinality disagrees with the recounted subtree.
	#[error("node {node} stores {side} count {stored} but the subtree holds {actual} nodes")]
	CountMismatch {
		/// Slot index of the offending node.
		node: u32,
		/// `"left"` or `"right"`.
		side: &'static str,
		/// The cardinality recorded in the node.
		stored: u32,
		/// The recounted cardinality.
		actual: u32,
	},

	/// The tree's element count disagrees with the nodes reachable from root.
	#[error("tree length {len} but {reachable} nodes are reachable from the root")]
	LengthMismatch {
		/// The tree's stored element count.
		len: usize,
		/// Nodes found by walking from the root.
		reachable: usize,
	},

	/// A balance factor left the AVL bound or disagrees with true heights.
	#[error("node {node} has balance {balance}, actual height difference {actual}")]
	BalanceOutOfRange {
		/// Slot index of the offending node.
		node: u32,
		/// The stored balance factor.
		balance: i8,
		/// height(right) − height(left) as recomputed.
		actual: i64,
	},

	/// Two adjacent keys in symmetric order do not strictly increase.
	#[error("node {node} breaks strict key ordering with its {side} subtree")]
	OrderViolation {
		/// Slot index of the offending node.
		node: u32,
		/// `"left"` or `"right"`.
		side: &'static str,
	},
}

/// Result alias for the consistency checkers.
pub type Result<T> = std::result::Result<T, CorruptError>;
