//! # Ranktree: An Indexable Ordered Map
//!
//! This crate provides an AVL tree augmented with subtree cardinalities
//! (an **order-statistics tree**) and parent back-references, giving an
//! in-memory, strictly-ordered, duplicate-free key→value index with O(log n)
//! insert, remove, lookup, rank and rank-selection operations.
//!
//! ## Design Overview
//!
//! **Order statistics**: every node tracks the number of nodes in its left
//! and right subtree. This turns two extra queries into O(log n) descents:
//! - [`RankTree::search`] resolves a key to its node *and* its zero-based
//!   rank among all keys.
//! - [`RankTree::select`] resolves a zero-based rank back to its node.
//!
//! **Stable handles**: nodes live in a slot arena ([`alloc`]) and are linked
//! by copyable [`NodeId`] indices instead of owned pointers. Rebalancing
//! re-links slots but never moves an entry between slots, so a `NodeId`
//! obtained for a key stays valid until that key is removed — even while
//! other keys are inserted and deleted around it. Removed slots go on a free
//! list and are recycled by later insertions.
//!
//! **Parent back-references**: each node stores an `up` link, so ordered
//! forward/backward traversal ([`RankTree::next`], [`RankTree::prev`], the
//! iterators in [`iter`]) needs no auxiliary stack and never allocates.
//!
//! ### Tree Structure
//!
//! ```text
//!             ┌───────────────────────┐
//!             │  RankTree             │
//!             │  root: NodeId         │
//!             │  len:  usize          │
//!             └──────────┬────────────┘
//!                        ▼
//!             ┌───────────────────────┐
//!             │ "04"  bal 0  [3][4]   │  <- key, balance factor,
//!             └───┬───────────────┬───┘     left/right subtree sizes
//!                 ▼               ▼
//!      ┌──────────────────┐ ┌──────────────────┐
//!      │ "02" bal 0 [1][1]│ │ "07" bal 0 [1][2]│
//!      └──────────────────┘ └──────────────────┘
//! ```
//!
//! ## Basic Usage
//!
//! ```
//! use ranktree::RankTree;
//!
//! let mut tree: RankTree<&str, u32> = RankTree::new();
//!
//! // Insert returns true for new keys, false when overwriting a value.
//! assert!(tree.insert("b", 2));
//! assert!(tree.insert("a", 1));
//! assert!(tree.insert("c", 3));
//! assert!(!tree.insert("b", 20));
//!
//! // Key lookup with rank.
//! let (node, rank) = tree.search(&"b").unwrap();
//! assert_eq!(rank, 1);
//! assert_eq!(*tree.value(node), 20);
//!
//! // Rank selection.
//! let second = tree.select(1).unwrap();
//! assert_eq!(*tree.key(second), "b");
//!
//! // Ordered iteration.
//! let keys: Vec<&str> = tree.iter().map(|(k, _)| *k).collect();
//! assert_eq!(keys, ["a", "b", "c"]);
//! ```
//!
//! ## Thread Safety
//!
//! A `RankTree` has **no internal locking**: callers that share a tree
//! across threads must serialize access externally (for example behind a
//! `Mutex`). The one piece of process-wide shared state is the node pool
//! bookkeeping in [`alloc`], which guards its counters with its own
//! short-lived lock and is safe to touch from many trees on many threads.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

pub mod alloc;
pub mod error;
pub mod iter;
mod util;

use alloc::{NodeArena, Side, NIL};
use error::CorruptError;

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// An ordered map with O(log n) rank queries and stable node handles.
///
/// # Type Parameters
///
/// - `K`: The key type. Must implement [`Ord`]; duplicate keys never
///   coexist — inserting an existing key overwrites its value in place.
/// - `V`: The value type. No bounds required.
///
/// # Handles
///
/// Lookup and traversal methods return [`NodeId`] handles rather than
/// references, so callers can hold a position in the tree across unrelated
/// mutations. A handle stays valid until *its own* key is removed; see
/// [`NodeId`] for the rules.
pub struct RankTree<K, V> {
	arena: NodeArena<K, V>,
	root: NodeId,
	len: usize,
}

impl<K, V> Default for RankTree<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V> RankTree<K, V> {
	/// Creates an empty tree.
	pub fn new() -> Self {
		RankTree {
			arena: NodeArena::new(),
			root: NIL,
			len: 0,
		}
	}

	/// Returns the number of entries in the tree.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns `true` if the tree contains no entries.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub(crate) fn root_id(&self) -> NodeId {
		self.root
	}

	#[inline]
	pub(crate) fn child_of(&self, id: NodeId, side: Side) -> NodeId {
		self.arena.slot(id).child[side as usize]
	}

	/// Sets `child` as `parent`'s child on `side` and re-links the child's
	/// `up` reference. `child` may be `NIL`.
	#[inline]
	fn link(&mut self, parent: NodeId, side: Side, child: NodeId) {
		self.arena.slot_mut(parent).child[side as usize] = child;
		if !child.is_nil() {
			self.arena.slot_mut(child).up = parent;
		}
	}

	// -----------------------------------------------------------------------
	// Public API: Node Accessors
	// -----------------------------------------------------------------------

	/// Returns the key stored at `id`.
	///
	/// # Panics
	///
	/// Panics if `id`'s key has been removed from the tree.
	pub fn key(&self, id: NodeId) -> &K {
		self.arena.slot(id).key()
	}

	/// Returns the value stored at `id`.
	///
	/// # Panics
	///
	/// Panics if `id`'s key has been removed from the tree.
	pub fn value(&self, id: NodeId) -> &V {
		match &self.arena.slot(id).entry {
			Some((_, v)) => v,
			None => panic!("accessed a freed node slot"),
		}
	}

	/// Returns a mutable reference to the value stored at `id`.
	///
	/// # Panics
	///
	/// Panics if `id`'s key has been removed from the tree.
	pub fn value_mut(&mut self, id: NodeId) -> &mut V {
		match &mut self.arena.slot_mut(id).entry {
			Some((_, v)) => v,
			None => panic!("accessed a freed node slot"),
		}
	}

	/// Returns the parent of `id`, or `None` for the root.
	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		let up = self.arena.slot(id).up;
		if up.is_nil() {
			None
		} else {
			Some(up)
		}
	}

	/// Returns the distance from `id` to the root (the root has depth 0),
	/// by walking the parent links. O(log n).
	pub fn depth(&self, id: NodeId) -> usize {
		let mut depth = 0;
		let mut at = self.arena.slot(id).up;
		while !at.is_nil() {
			depth += 1;
			at = self.arena.slot(at).up;
		}
		depth
	}

	// -----------------------------------------------------------------------
	// Public API: Ordered Traversal
	// -----------------------------------------------------------------------

	/// Returns the node holding the smallest key, or `None` if empty.
	pub fn first(&self) -> Option<NodeId> {
		self.extreme(Side::Left)
	}

	/// Returns the node holding the largest key, or `None` if empty.
	pub fn last(&self) -> Option<NodeId> {
		self.extreme(Side::Right)
	}

	fn extreme(&self, side: Side) -> Option<NodeId> {
		if self.root.is_nil() {
			return None;
		}
		Some(self.extreme_in(self.root, side))
	}

	/// Walks to the outermost node on `side` within the subtree at `at`.
	pub(crate) fn extreme_in(&self, mut at: NodeId, side: Side) -> NodeId {
		loop {
			let next = self.child_of(at, side);
			if next.is_nil() {
				return at;
			}
			at = next;
		}
	}

	/// Returns the node holding the next-larger key, or `None` at the end.
	///
	/// Runs on parent links alone: amortized O(log n) per step, O(n) for a
	/// full sweep, and never allocates.
	pub fn next(&self, id: NodeId) -> Option<NodeId> {
		self.step(id, Side::Right)
	}

	/// Returns the node holding the next-smaller key, or `None` at the start.
	pub fn prev(&self, id: NodeId) -> Option<NodeId> {
		self.step(id, Side::Left)
	}

	fn step(&self, id: NodeId, dir: Side) -> Option<NodeId> {
		let ahead = self.child_of(id, dir);
		if !ahead.is_nil() {
			return Some(self.extreme_in(ahead, dir.opposite()));
		}
		// No subtree ahead: climb until we arrive from the other side.
		let mut at = id;
		loop {
			let up = self.arena.slot(at).up;
			if up.is_nil() {
				return None;
			}
			if self.child_of(up, dir.opposite()) == at {
				return Some(up);
			}
			at = up;
		}
	}
}

impl<K: Ord, V> RankTree<K, V> {
	// -----------------------------------------------------------------------
	// Public API: Lookups
	// -----------------------------------------------------------------------

	/// Finds `key` and returns its node together with its zero-based rank
	/// among all keys.
	///
	/// The rank accumulates the left-subtree cardinalities along the
	/// descent, so the whole query is a single O(log n) walk.
	///
	/// # Example
	///
	/// ```
	/// use ranktree::RankTree;
	///
	/// let mut tree: RankTree<i32, &str> = RankTree::new();
	/// tree.insert(10, "ten");
	/// tree.insert(20, "twenty");
	/// tree.insert(30, "thirty");
	///
	/// let (node, rank) = tree.search(&20).unwrap();
	/// assert_eq!(rank, 1);
	/// assert_eq!(*tree.key(node), 20);
	/// assert!(tree.search(&25).is_none());
	/// ```
	pub fn search<Q>(&self, key: &Q) -> Option<(NodeId, usize)>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let mut at = self.root;
		let mut rank = 0usize;
		while !at.is_nil() {
			let slot = self.arena.slot(at);
			match key.cmp(slot.key().borrow()) {
				Ordering::Less => at = slot.child[Side::Left as usize],
				Ordering::Equal => {
					return Some((at, rank + slot.counts[Side::Left as usize] as usize))
				}
				Ordering::Greater => {
					rank += slot.counts[Side::Left as usize] as usize + 1;
					at = slot.child[Side::Right as usize];
				}
			}
		}
		None
	}

	/// Returns the zero-based rank of `key`, or `None` if absent.
	pub fn rank<Q>(&self, key: &Q) -> Option<usize>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.search(key).map(|(_, rank)| rank)
	}

	/// Returns the node at zero-based `rank`, or `None` when
	/// `rank >= self.len()`. Out-of-range ranks are rejected without
	/// traversal.
	///
	/// # Example
	///
	/// ```
	/// use ranktree::RankTree;
	///
	/// let mut tree: RankTree<&str, ()> = RankTree::new();
	/// for key in ["c", "a", "b"] {
	///     tree.insert(key, ());
	/// }
	/// assert_eq!(*tree.key(tree.select(0).unwrap()), "a");
	/// assert_eq!(*tree.key(tree.select(2).unwrap()), "c");
	/// assert!(tree.select(3).is_none());
	/// ```
	pub fn select(&self, rank: usize) -> Option<NodeId> {
		if rank >= self.len {
			return None;
		}
		let mut at = self.root;
		let mut rank = rank;
		loop {
			let slot = self.arena.slot(at);
			let left = slot.counts[Side::Left as usize] as usize;
			match rank.cmp(&left) {
				Ordering::Less => at = slot.child[Side::Left as usize],
				Ordering::Equal => return Some(at),
				Ordering::Greater => {
					rank -= left + 1;
					at = slot.child[Side::Right as usize];
				}
			}
		}
	}

	/// Returns a reference to the value for `key`, or `None` if absent.
	pub fn get<Q>(&self, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let (id, _) = self.search(key)?;
		Some(self.value(id))
	}

	/// Returns a mutable reference to the value for `key`, or `None`.
	pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let (id, _) = self.search(key)?;
		Some(self.value_mut(id))
	}

	/// Returns `true` if the tree contains `key`.
	pub fn contains_key<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.search(key).is_some()
	}

	// -----------------------------------------------------------------------
	// Public API: Write Operations
	// -----------------------------------------------------------------------

	/// Inserts a key-value pair.
	///
	/// Returns `true` if `key` was newly inserted. If `key` already exists
	/// the stored value is overwritten in place and `false` is returned,
	/// with no structural change, no count change, and no handle
	/// invalidation.
	///
	/// # Example
	///
	/// ```
	/// use ranktree::RankTree;
	///
	/// let mut tree: RankTree<i32, &str> = RankTree::new();
	/// assert!(tree.insert(1, "one"));
	/// assert!(!tree.insert(1, "uno"));
	/// assert_eq!(tree.len(), 1);
	/// assert_eq!(tree.get(&1), Some(&"uno"));
	/// ```
	pub fn insert(&mut self, key: K, value: V) -> bool {
		let root = self.root;
		let (new_root, inserted, _) = self.insert_at(root, key, value);
		self.root = new_root;
		self.arena.slot_mut(new_root).up = NIL;
		if inserted {
			self.len += 1;
		}
		inserted
	}

	/// Recursive insertion descent.
	///
	/// Returns the (possibly rotated) subtree root, whether a new key was
	/// inserted, and whether the subtree's height grew. The caller is
	/// responsible for linking the returned root into its parent.
	fn insert_at(&mut self, at: NodeId, key: K, value: V) -> (NodeId, bool, bool) {
		if at.is_nil() {
			return (self.arena.allocate(key, value), true, true);
		}

		let side = match key.cmp(self.arena.slot(at).key()) {
			Ordering::Equal => {
				// Overwrite in place; the tree keeps its original key.
				match self.arena.slot_mut(at).entry.as_mut() {
					Some((_, v)) => *v = value,
					None => unreachable!("live node without an entry"),
				}
				return (at, false, false);
			}
			Ordering::Less => Side::Left,
			Ordering::Greater => Side::Right,
		};

		let child = self.child_of(at, side);
		let (sub, inserted, grew) = self.insert_at(child, key, value);
		self.link(at, side, sub);
		if inserted {
			self.arena.slot_mut(at).counts[side as usize] += 1;
		}
		if !grew {
			return (at, inserted, false);
		}

		let lean = side.sign();
		let balance = self.arena.slot(at).balance;
		if balance == -lean {
			// Grew on the short side: this node absorbs the height change.
			self.arena.slot_mut(at).balance = 0;
			(at, inserted, false)
		} else if balance == 0 {
			self.arena.slot_mut(at).balance = lean;
			(at, inserted, true)
		} else {
			// Would reach ±2: a rotation restores the pre-growth height,
			// so growth never propagates past this level.
			let (root, _) = self.rebalance(at, side);
			(root, inserted, false)
		}
	}

	/// Removes `key`, returning its value if it was present.
	///
	/// Removal preserves the handles of every surviving key: when the
	/// removed node has two children, its in-order predecessor *node* is
	/// detached and re-linked into the removed node's structural position,
	/// and it is the removed node's slot that returns to the pool.
	///
	/// # Example
	///
	/// ```
	/// use ranktree::RankTree;
	///
	/// let mut tree: RankTree<i32, &str> = RankTree::new();
	/// tree.insert(1, "one");
	///
	/// assert_eq!(tree.remove(&1), Some("one"));
	/// assert_eq!(tree.remove(&1), None); // Already removed
	/// ```
	pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let root = self.root;
		let (new_root, removed, _) = self.remove_at(root, key);
		self.root = new_root;
		if !new_root.is_nil() {
			self.arena.slot_mut(new_root).up = NIL;
		}
		if removed.is_some() {
			self.len -= 1;
		}
		removed
	}

	/// Recursive removal descent.
	///
	/// Returns the subtree root, the removed value, and whether the
	/// subtree's height shrank.
	fn remove_at<Q>(&mut self, at: NodeId, key: &Q) -> (NodeId, Option<V>, bool)
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		if at.is_nil() {
			return (NIL, None, false);
		}

		let side = match key.cmp(self.arena.slot(at).key().borrow()) {
			Ordering::Equal => return self.remove_here(at),
			Ordering::Less => Side::Left,
			Ordering::Greater => Side::Right,
		};

		let child = self.child_of(at, side);
		let (sub, removed, shrank) = self.remove_at(child, key);
		self.link(at, side, sub);
		if removed.is_some() {
			self.arena.slot_mut(at).counts[side as usize] -= 1;
		}
		if !shrank {
			return (at, removed, false);
		}
		let (root, still) = self.shrink_fixup(at, side);
		(root, removed, still)
	}

	/// Detaches the node `at` from its position.
	fn remove_here(&mut self, at: NodeId) -> (NodeId, Option<V>, bool) {
		let [left, right] = self.arena.slot(at).child;

		if right.is_nil() {
			// The left child (possibly NIL) is spliced into our position;
			// the caller re-links its parent reference.
			let (_, value) = self.arena.reclaim(at);
			return (left, Some(value), true);
		}
		if left.is_nil() {
			let (_, value) = self.arena.reclaim(at);
			return (right, Some(value), true);
		}

		// Two children: detach the in-order predecessor (rightmost node of
		// the left subtree) and re-link that node into our position. The
		// predecessor keeps its slot, so its handle survives; the slot
		// returned to the pool is the removed key's.
		let (new_left, pred, shrank) = self.detach_rightmost(left);
		let slot = self.arena.slot(at);
		let balance = slot.balance;
		let counts = slot.counts;
		let (_, value) = self.arena.reclaim(at);

		{
			let p = self.arena.slot_mut(pred);
			p.balance = balance;
			// The predecessor came out of the left subtree.
			p.counts = [counts[Side::Left as usize] - 1, counts[Side::Right as usize]];
		}
		self.link(pred, Side::Left, new_left);
		self.link(pred, Side::Right, right);

		if shrank {
			let (root, still) = self.shrink_fixup(pred, Side::Left);
			(root, Some(value), still)
		} else {
			(pred, Some(value), false)
		}
	}

	/// Detaches the rightmost node of the subtree at `at`, rebalancing the
	/// descent path. Returns the remaining subtree root (possibly `NIL`),
	/// the detached node, and whether the subtree's height shrank.
	fn detach_rightmost(&mut self, at: NodeId) -> (NodeId, NodeId, bool) {
		let right = self.child_of(at, Side::Right);
		if right.is_nil() {
			// `at` is the rightmost node; its left child takes its place.
			let left = self.child_of(at, Side::Left);
			return (left, at, true);
		}

		let (sub, detached, shrank) = self.detach_rightmost(right);
		self.link(at, Side::Right, sub);
		self.arena.slot_mut(at).counts[Side::Right as usize] -= 1;
		if !shrank {
			return (at, detached, false);
		}
		let (root, still) = self.shrink_fixup(at, Side::Right);
		(root, detached, still)
	}

	/// Adjusts `at` after its subtree on `side` lost one level of height.
	/// Returns the subtree root and whether the shrink propagates upward.
	fn shrink_fixup(&mut self, at: NodeId, side: Side) -> (NodeId, bool) {
		let lean = side.sign();
		let balance = self.arena.slot(at).balance;
		if balance == lean {
			// Was leaning toward the shrunk side: now balanced, but one
			// level shorter overall.
			self.arena.slot_mut(at).balance = 0;
			(at, true)
		} else if balance == 0 {
			self.arena.slot_mut(at).balance = -lean;
			(at, false)
		} else {
			// Leaning away from the shrunk side: rotate toward it.
			self.rebalance(at, side.opposite())
		}
	}

	// -----------------------------------------------------------------------
	// Rotations
	// -----------------------------------------------------------------------

	/// Restores the AVL bound at `at`, whose subtree on `heavy` is two
	/// levels taller than its sibling. Chooses a single rotation when the
	/// heavy child does not lean the opposite way, a double rotation
	/// otherwise. Returns the new subtree root and whether the subtree's
	/// total height decreased by one.
	fn rebalance(&mut self, at: NodeId, heavy: Side) -> (NodeId, bool) {
		let lean = heavy.sign();
		let child = self.child_of(at, heavy);
		let child_balance = self.arena.slot(child).balance;

		if child_balance == -lean {
			// Double rotation: promote the grandchild between `child` and
			// `at`. Its old balance tells which side ends up short.
			let grand = self.child_of(child, heavy.opposite());
			let grand_balance = self.arena.slot(grand).balance;
			let root = self.rotate_twice(at, heavy);
			debug_assert_eq!(root, grand);

			let (child_bal, at_bal) = if grand_balance == lean {
				(0, -lean)
			} else if grand_balance == 0 {
				(0, 0)
			} else {
				(lean, 0)
			};
			self.arena.slot_mut(child).balance = child_bal;
			self.arena.slot_mut(at).balance = at_bal;
			self.arena.slot_mut(grand).balance = 0;
			(grand, true)
		} else {
			let root = self.rotate(at, heavy);
			debug_assert_eq!(root, child);
			if child_balance == lean {
				self.arena.slot_mut(at).balance = 0;
				self.arena.slot_mut(child).balance = 0;
				(child, true)
			} else {
				// Balanced child: only reachable on the shrink path. The
				// rotation leaves the subtree at its previous height, so a
				// shrink stops propagating here.
				self.arena.slot_mut(at).balance = lean;
				self.arena.slot_mut(child).balance = -lean;
				(child, false)
			}
		}
	}

	/// Single rotation promoting `at`'s child on `heavy`.
	///
	/// Re-links the `up` references of every moved node and recomputes the
	/// subtree counts of the pivot and the demoted node. Balance factors
	/// are set by the caller. Returns the new subtree root.
	fn rotate(&mut self, at: NodeId, heavy: Side) -> NodeId {
		let hi = heavy as usize;
		let oi = heavy.opposite() as usize;

		let child = self.arena.slot(at).child[hi];
		let inner = self.arena.slot(child).child[oi];

		self.arena.slot_mut(at).child[hi] = inner;
		if !inner.is_nil() {
			self.arena.slot_mut(inner).up = at;
		}
		let up = self.arena.slot(at).up;
		{
			let c = self.arena.slot_mut(child);
			c.child[oi] = at;
			c.up = up;
		}
		self.arena.slot_mut(at).up = child;

		// `at` inherits the inner subtree; `child` now holds all of `at`.
		let inner_count = self.arena.slot(child).counts[oi];
		self.arena.slot_mut(at).counts[hi] = inner_count;
		let demoted_total = self.arena.slot(at).subtree_len();
		self.arena.slot_mut(child).counts[oi] = demoted_total;

		child
	}

	/// Double rotation promoting the grandchild on the inside of the
	/// `heavy` path. Structure and counts only; balances are set by the
	/// caller. Returns the new subtree root.
	fn rotate_twice(&mut self, at: NodeId, heavy: Side) -> NodeId {
		let hi = heavy as usize;
		let oi = heavy.opposite() as usize;

		let child = self.arena.slot(at).child[hi];
		let grand = self.arena.slot(child).child[oi];
		let inner_near = self.arena.slot(grand).child[hi];
		let inner_far = self.arena.slot(grand).child[oi];

		// The grandchild's subtrees split between `child` and `at`.
		self.arena.slot_mut(child).child[oi] = inner_near;
		if !inner_near.is_nil() {
			self.arena.slot_mut(inner_near).up = child;
		}
		self.arena.slot_mut(at).child[hi] = inner_far;
		if !inner_far.is_nil() {
			self.arena.slot_mut(inner_far).up = at;
		}

		let up = self.arena.slot(at).up;
		{
			let g = self.arena.slot_mut(grand);
			g.child[hi] = child;
			g.child[oi] = at;
			g.up = up;
		}
		self.arena.slot_mut(child).up = grand;
		self.arena.slot_mut(at).up = grand;

		let near_count = self.arena.slot(grand).counts[hi];
		let far_count = self.arena.slot(grand).counts[oi];
		self.arena.slot_mut(child).counts[oi] = near_count;
		self.arena.slot_mut(at).counts[hi] = far_count;
		let child_total = self.arena.slot(child).subtree_len();
		let at_total = self.arena.slot(at).subtree_len();
		{
			let g = self.arena.slot_mut(grand);
			g.counts[hi] = child_total;
			g.counts[oi] = at_total;
		}

		grand
	}
}

impl<K, V> RankTree<K, V> {
	/// Removes all entries, returning every slot to the arena's free list.
	pub fn clear(&mut self) {
		self.arena.clear();
		self.root = NIL;
		self.len = 0;
	}

	/// Total node slots backing this tree (live + pooled).
	pub fn slot_count(&self) -> usize {
		self.arena.slot_count()
	}

	/// Node slots of this tree currently sitting on its free list.
	pub fn free_slot_count(&self) -> usize {
		self.arena.free_count()
	}
}

// ---------------------------------------------------------------------------
// Consistency Checkers
// ---------------------------------------------------------------------------

impl<K, V> RankTree<K, V> {
	/// Verifies that every node's `up` link matches its true parent and
	/// that the root has none.
	///
	/// Diagnostic walk for tests and debugging; production paths never
	/// need it. A returned error means the index is corrupted and should
	/// be treated as fatal.
	pub fn check_parent_links(&self) -> error::Result<()> {
		if self.root.is_nil() {
			return Ok(());
		}
		let up = self.arena.slot(self.root).up;
		if !up.is_nil() {
			return Err(CorruptError::ParentMismatch {
				node: self.root.0,
				stored: Some(up.0),
				actual: None,
			});
		}
		self.check_parents_in(self.root)
	}

	fn check_parents_in(&self, at: NodeId) -> error::Result<()> {
		for side in [Side::Left, Side::Right] {
			let child = self.child_of(at, side);
			if child.is_nil() {
				continue;
			}
			let up = self.arena.slot(child).up;
			if up != at {
				return Err(CorruptError::ParentMismatch {
					node: child.0,
					stored: if up.is_nil() { None } else { Some(up.0) },
					actual: Some(at.0),
				});
			}
			self.check_parents_in(child)?;
		}
		Ok(())
	}

	/// Recomputes subtree sizes bottom-up and compares them against the
	/// stored cardinalities, then checks the tree's element count against
	/// the number of reachable nodes.
	pub fn check_subtree_counts(&self) -> error::Result<()> {
		let reachable = self.count_in(self.root)?;
		if reachable as usize != self.len {
			return Err(CorruptError::LengthMismatch {
				len: self.len,
				reachable: reachable as usize,
			});
		}
		Ok(())
	}

	fn count_in(&self, at: NodeId) -> error::Result<u32> {
		if at.is_nil() {
			return Ok(0);
		}
		let slot = self.arena.slot(at);
		let [left, right] = slot.child;
		let stored = slot.counts;

		let left_actual = self.count_in(left)?;
		if stored[Side::Left as usize] != left_actual {
			return Err(CorruptError::CountMismatch {
				node: at.0,
				side: "left",
				stored: stored[Side::Left as usize],
				actual: left_actual,
			});
		}
		let right_actual = self.count_in(right)?;
		if stored[Side::Right as usize] != right_actual {
			return Err(CorruptError::CountMismatch {
				node: at.0,
				side: "right",
				stored: stored[Side::Right as usize],
				actual: right_actual,
			});
		}
		Ok(left_actual + right_actual + 1)
	}
}

impl<K: Ord, V> RankTree<K, V> {
	/// Validates every structural invariant. Panics with diagnostic info
	/// on the first violation.
	///
	/// Checked invariants:
	///
	/// 1. Parent integrity: `up` links match true parents
	/// 2. Cardinalities: stored subtree counts match recounted sizes, and
	///    `len` matches the reachable node count
	/// 3. Balance: every factor is in {−1, 0, +1} and equals the true
	///    height difference
	/// 4. Ordering: symmetric-order traversal yields strictly increasing
	///    keys
	pub fn assert_invariants(&self) {
		if let Err(e) = self.check_parent_links() {
			panic!("parent-link check failed: {e}");
		}
		if let Err(e) = self.check_subtree_counts() {
			panic!("subtree-count check failed: {e}");
		}
		if let Err(e) = self.check_heights_in(self.root) {
			panic!("balance check failed: {e}");
		}
		if let Err(e) = self.check_ordering() {
			panic!("ordering check failed: {e}");
		}
	}

	fn check_heights_in(&self, at: NodeId) -> error::Result<i64> {
		if at.is_nil() {
			return Ok(0);
		}
		let slot = self.arena.slot(at);
		let left = self.check_heights_in(slot.child[Side::Left as usize])?;
		let right = self.check_heights_in(slot.child[Side::Right as usize])?;
		let diff = right - left;
		if !(-1..=1).contains(&diff) || i64::from(slot.balance) != diff {
			return Err(CorruptError::BalanceOutOfRange {
				node: at.0,
				balance: slot.balance,
				actual: diff,
			});
		}
		Ok(left.max(right) + 1)
	}

	fn check_ordering(&self) -> error::Result<()> {
		let mut at = match self.first() {
			Some(id) => id,
			None => return Ok(()),
		};
		while let Some(next) = self.next(at) {
			if self.key(at).cmp(self.key(next)) != Ordering::Less {
				return Err(CorruptError::OrderViolation {
					node: at.0,
					side: "right",
				});
			}
			at = next;
		}
		Ok(())
	}
}

// ---------------------------------------------------------------------------
// Trait Implementations
// ---------------------------------------------------------------------------

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RankTree<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}

impl<K: Ord, V> FromIterator<(K, V)> for RankTree<K, V> {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut tree = RankTree::new();
		for (k, v) in iter {
			tree.insert(k, v);
		}
		tree
	}
}

impl<K: Ord, V> Extend<(K, V)> for RankTree<K, V> {
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (k, v) in iter {
			self.insert(k, v);
		}
	}
}

impl<'t, K, V> IntoIterator for &'t RankTree<K, V> {
	type Item = (&'t K, &'t V);
	type IntoIter = iter::Iter<'t, K, V>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

pub use alloc::{pool_stats, NodeId, PoolStats};
