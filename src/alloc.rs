//! Slot arena and free-list node allocator.
//!
//! Tree nodes live in a flat slot vector owned by each tree. Links between
//! nodes (`child`, `up`) are [`NodeId`] slot indices rather than owned
//! pointers, which sidesteps the parent/child reference cycle that an owning
//! representation cannot express. A slot index is a *stable handle*: the
//! entry stored in a slot never moves to another slot during rebalancing,
//! so a `NodeId` obtained for a key remains valid until that key is removed.
//!
//! Reclaimed slots are threaded onto a per-arena free list and reused by
//! later insertions, so an insert/remove churn does not grow the slot vector.
//! While a slot sits on the free list its `up` field is repurposed as the
//! free-list "next" link; this is the only place where the field's meaning is
//! contextual, and it is reset on both the allocate and reclaim paths before
//! any caller can observe it.
//!
//! The module also keeps process-wide pool counters (total slots created,
//! total slots sitting free) shared by every arena in the process. The
//! counters are guarded by a single [`parking_lot::Mutex`] held only for the
//! counter update itself, never across a tree operation. Arenas may be used
//! from different threads at the same time; an individual arena (like the
//! tree that owns it) is not thread-safe.
//!
//! # Usage
//!
//! ```
//! use ranktree::RankTree;
//! use ranktree::alloc::pool_stats;
//!
//! let mut tree: RankTree<i32, &str> = RankTree::new();
//! tree.insert(1, "one");
//!
//! let stats = pool_stats();
//! assert!(stats.created >= 1);
//! ```

use parking_lot::Mutex;

/// Index of a node slot within its tree's arena.
///
/// `NodeId`s are handed out by [`RankTree::search`](crate::RankTree::search),
/// [`RankTree::select`](crate::RankTree::select) and the traversal methods,
/// and stay valid until the key they were obtained for is removed from the
/// tree. Using a `NodeId` after its key has been removed is a logic error:
/// the accessor methods will panic if the slot is free, or silently address
/// a different entry if the slot has been recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

/// Sentinel for "no node": absent child, root's parent, empty free list.
pub(crate) const NIL: NodeId = NodeId(u32::MAX);

impl NodeId {
	#[inline]
	pub(crate) fn is_nil(self) -> bool {
		self == NIL
	}

	#[inline]
	pub(crate) fn index(self) -> usize {
		self.0 as usize
	}
}

/// Side of a node: left child / left subtree or right child / right subtree.
///
/// Indexing `child` and `counts` arrays by `Side` lets the rebalancing code
/// be written once and mirrored by flipping the side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
	Left = 0,
	Right = 1,
}

impl Side {
	#[inline]
	pub(crate) fn opposite(self) -> Side {
		match self {
			Side::Left => Side::Right,
			Side::Right => Side::Left,
		}
	}

	/// The balance-factor contribution of growth on this side:
	/// −1 for left, +1 for right (balance = height(right) − height(left)).
	#[inline]
	pub(crate) fn sign(self) -> i8 {
		match self {
			Side::Left => -1,
			Side::Right => 1,
		}
	}
}

/// One arena slot.
///
/// Live slots carry `entry == Some((key, value))` and use `up` as the parent
/// link (`NIL` for the root). Free slots carry `entry == None` and use `up`
/// as the next-free link.
pub(crate) struct Slot<K, V> {
	/// Left and right child links, `NIL` when absent.
	pub child: [NodeId; 2],
	/// Parent link while live; next free slot while pooled.
	pub up: NodeId,
	/// Number of live nodes in the left / right subtree, excluding this node.
	pub counts: [u32; 2],
	/// height(right) − height(left), kept in {−1, 0, +1}.
	pub balance: i8,
	/// Key and value; `None` only while the slot is on the free list.
	pub entry: Option<(K, V)>,
}

impl<K, V> Slot<K, V> {
	#[inline]
	pub fn key(&self) -> &K {
		match &self.entry {
			Some((k, _)) => k,
			None => panic!("accessed a freed node slot"),
		}
	}

	#[inline]
	pub fn subtree_len(&self) -> u32 {
		self.counts[0] + self.counts[1] + 1
	}
}

/// Per-tree node arena with free-list recycling.
pub(crate) struct NodeArena<K, V> {
	slots: Vec<Slot<K, V>>,
	/// Head of the freed-slot list, linked through `Slot::up`.
	free_head: NodeId,
	free_len: usize,
}

impl<K, V> NodeArena<K, V> {
	pub fn new() -> Self {
		NodeArena {
			slots: Vec::new(),
			free_head: NIL,
			free_len: 0,
		}
	}

	#[inline]
	pub fn slot(&self, id: NodeId) -> &Slot<K, V> {
		&self.slots[id.index()]
	}

	#[inline]
	pub fn slot_mut(&mut self, id: NodeId) -> &mut Slot<K, V> {
		&mut self.slots[id.index()]
	}

	/// Total slots ever created by this arena (live + free).
	pub fn slot_count(&self) -> usize {
		self.slots.len()
	}

	/// Slots currently sitting on the free list.
	pub fn free_count(&self) -> usize {
		self.free_len
	}

	/// Hands out a reset slot holding `key`/`value`, preferring a recycled
	/// slot over growing the slot vector.
	///
	/// The returned slot always has no children, no parent, zero subtree
	/// counts and a zero balance factor. Out-of-memory aborts the process
	/// (via `Vec` growth); allocation is never a recoverable error.
	pub fn allocate(&mut self, key: K, value: V) -> NodeId {
		if self.free_head.is_nil() {
			let id = NodeId(self.slots.len() as u32);
			assert!(id.0 < u32::MAX, "node arena exhausted u32 slot indices");
			self.slots.push(Slot {
				child: [NIL, NIL],
				up: NIL,
				counts: [0, 0],
				balance: 0,
				entry: Some((key, value)),
			});
			pool_created(1);
			id
		} else {
			let id = self.free_head;
			let slot = self.slot_mut(id);
			debug_assert!(slot.entry.is_none(), "free list reached a live slot");
			// Unlink from the free list and restore `up` to its in-tree
			// meaning before the caller can see the slot.
			let next_free = slot.up;
			slot.up = NIL;
			slot.child = [NIL, NIL];
			slot.counts = [0, 0];
			slot.balance = 0;
			slot.entry = Some((key, value));
			self.free_head = next_free;
			self.free_len -= 1;
			pool_recycled(1);
			id
		}
	}

	/// Returns the slot's entry and pushes the slot onto the free-list head,
	/// repurposing `up` as the next-free link.
	pub fn reclaim(&mut self, id: NodeId) -> (K, V) {
		let head = self.free_head;
		let slot = self.slot_mut(id);
		let entry = match slot.entry.take() {
			Some(entry) => entry,
			None => panic!("reclaimed a node slot twice"),
		};
		slot.child = [NIL, NIL];
		slot.counts = [0, 0];
		slot.balance = 0;
		slot.up = head;
		self.free_head = id;
		self.free_len += 1;
		pool_freed(1);
		entry
	}

	/// Drops every entry and rebuilds the free list over all slots.
	pub fn clear(&mut self) {
		let live = self.slots.len() - self.free_len;
		self.free_head = NIL;
		self.free_len = 0;
		for (i, slot) in self.slots.iter_mut().enumerate() {
			slot.entry = None;
			slot.child = [NIL, NIL];
			slot.counts = [0, 0];
			slot.balance = 0;
			slot.up = self.free_head;
			self.free_head = NodeId(i as u32);
			self.free_len += 1;
		}
		pool_freed(live);
	}
}

impl<K, V> Drop for NodeArena<K, V> {
	fn drop(&mut self) {
		let mut pool = POOL.lock();
		pool.created = pool.created.saturating_sub(self.slots.len() as u64);
		pool.free = pool.free.saturating_sub(self.free_len as u64);
	}
}

// ---------------------------------------------------------------------------
// Process-wide pool bookkeeping
// ---------------------------------------------------------------------------

struct PoolCounters {
	created: u64,
	free: u64,
	recycled: u64,
}

static POOL: Mutex<PoolCounters> = Mutex::new(PoolCounters {
	created: 0,
	free: 0,
	recycled: 0,
});

#[inline]
fn pool_created(n: usize) {
	POOL.lock().created += n as u64;
}

#[inline]
fn pool_freed(n: usize) {
	POOL.lock().free += n as u64;
}

#[inline]
fn pool_recycled(n: usize) {
	let mut pool = POOL.lock();
	pool.free -= n as u64;
	pool.recycled += n as u64;
}

/// Snapshot of the process-wide node pool counters.
///
/// Counters aggregate over every live arena in the process; an arena's slots
/// are deducted when its tree is dropped.
#[derive(Debug, Clone, Copy)]
pub struct PoolStats {
	/// Slots currently backing live arenas (live nodes + pooled slots).
	pub created: u64,
	/// Slots currently sitting on a free list somewhere in the process.
	pub free: u64,
	/// Allocations served from a free list rather than fresh slot growth.
	pub recycled: u64,
}

/// Returns the current process-wide pool counters.
pub fn pool_stats() -> PoolStats {
	let pool = POOL.lock();
	PoolStats {
		created: pool.created,
		free: pool.free,
		recycled: pool.recycled,
	}
}

/// Resets the recycling counter. Intended for tests that measure reuse over
/// a bounded workload; the `created`/`free` counters track live state and
/// are not resettable.
pub fn reset_recycle_counter() {
	POOL.lock().recycled = 0;
}
