//! Iterators and cursors over the entries of a [`RankTree`].
//!
//! All traversal here rides on the tree's parent back-references: stepping
//! to a neighbouring key follows `child`/`up` links only, so iteration
//! never allocates and needs no auxiliary stack. A full sweep visits each
//! edge at most twice, giving O(n) total work.
//!
//! Two styles are provided:
//!
//! - [`Iter`] (and the [`Keys`]/[`Values`] adapters): ordinary Rust
//!   iterators over `(&K, &V)`, double-ended and exact-sized.
//! - [`Cursor`]: an explicit position between entries that can seek to
//!   either end or to a key, then walk forwards and backwards freely —
//!   the shape callers want when they interleave direction changes.

use crate::alloc::{NodeId, Side};
use crate::RankTree;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// A cursor position: between, before, or after entries.
///
/// `Before(n)`/`After(n)` pin the cursor to the gap adjacent to node `n`,
/// so a `next` immediately followed by a `prev` (or vice versa) returns
/// the same entry again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pos {
	/// Before the first entry.
	Start,
	/// Immediately before this node.
	Before(NodeId),
	/// Immediately after this node.
	After(NodeId),
	/// After the last entry.
	End,
}

/// A bidirectional cursor over a tree's entries.
///
/// Created by [`RankTree::cursor`]. The cursor holds a shared borrow of
/// the tree, so the tree cannot be mutated while a cursor is live.
///
/// # Example
///
/// ```
/// use ranktree::RankTree;
///
/// let tree: RankTree<i32, &str> = [(1, "a"), (2, "b"), (3, "c")].into_iter().collect();
///
/// let mut cursor = tree.cursor();
/// cursor.seek(&2);
/// assert_eq!(cursor.next(), Some((&2, &"b")));
/// assert_eq!(cursor.next(), Some((&3, &"c")));
/// assert_eq!(cursor.next(), None);
/// assert_eq!(cursor.prev(), Some((&3, &"c")));
/// ```
pub struct Cursor<'t, K, V> {
	tree: &'t RankTree<K, V>,
	pos: Pos,
}

impl<'t, K, V> Cursor<'t, K, V> {
	pub(crate) fn new(tree: &'t RankTree<K, V>) -> Self {
		Cursor {
			tree,
			pos: Pos::Start,
		}
	}

	/// Positions the cursor before the first entry.
	pub fn seek_to_first(&mut self) {
		self.pos = Pos::Start;
	}

	/// Positions the cursor after the last entry.
	pub fn seek_to_last(&mut self) {
		self.pos = Pos::End;
	}

	/// Returns the entry after the cursor and moves past it.
	pub fn next(&mut self) -> Option<(&'t K, &'t V)> {
		let ahead = match self.pos {
			Pos::Start => self.tree.first(),
			Pos::Before(id) => Some(id),
			Pos::After(id) => self.tree.next(id),
			Pos::End => None,
		};
		match ahead {
			Some(id) => {
				self.pos = Pos::After(id);
				Some((self.tree.key(id), self.tree.value(id)))
			}
			None => {
				self.pos = Pos::End;
				None
			}
		}
	}

	/// Returns the entry before the cursor and moves before it.
	pub fn prev(&mut self) -> Option<(&'t K, &'t V)> {
		let behind = match self.pos {
			Pos::End => self.tree.last(),
			Pos::After(id) => Some(id),
			Pos::Before(id) => self.tree.prev(id),
			Pos::Start => None,
		};
		match behind {
			Some(id) => {
				self.pos = Pos::Before(id);
				Some((self.tree.key(id), self.tree.value(id)))
			}
			None => {
				self.pos = Pos::Start;
				None
			}
		}
	}
}

impl<'t, K: Ord, V> Cursor<'t, K, V> {
	/// Positions the cursor before the first key that is `>= key`
	/// (after the last entry when no such key exists).
	pub fn seek<Q>(&mut self, key: &Q)
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.pos = match self.tree.lower_bound(key) {
			Some(id) => Pos::Before(id),
			None => Pos::End,
		};
	}
}

/// Iterator over `(&K, &V)` entries in ascending key order.
///
/// Created by [`RankTree::iter`]. Double-ended and exact-sized; the two
/// ends meet without overlap.
pub struct Iter<'t, K, V> {
	tree: &'t RankTree<K, V>,
	/// Next node the front will yield.
	front: Option<NodeId>,
	/// Next node the back will yield.
	back: Option<NodeId>,
	remaining: usize,
}

impl<'t, K, V> Iter<'t, K, V> {
	pub(crate) fn new(tree: &'t RankTree<K, V>) -> Self {
		Iter {
			tree,
			front: tree.first(),
			back: tree.last(),
			remaining: tree.len(),
		}
	}
}

impl<'t, K, V> Iterator for Iter<'t, K, V> {
	type Item = (&'t K, &'t V);

	fn next(&mut self) -> Option<Self::Item> {
		if self.remaining == 0 {
			return None;
		}
		let id = match self.front {
			Some(id) => id,
			None => return None,
		};
		self.remaining -= 1;
		self.front = self.tree.next(id);
		Some((self.tree.key(id), self.tree.value(id)))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<'t, K, V> DoubleEndedIterator for Iter<'t, K, V> {
	fn next_back(&mut self) -> Option<Self::Item> {
		if self.remaining == 0 {
			return None;
		}
		let id = match self.back {
			Some(id) => id,
			None => return None,
		};
		self.remaining -= 1;
		self.back = self.tree.prev(id);
		Some((self.tree.key(id), self.tree.value(id)))
	}
}

impl<'t, K, V> ExactSizeIterator for Iter<'t, K, V> {}

/// Iterator over keys in ascending order. Created by [`RankTree::keys`].
pub struct Keys<'t, K, V> {
	inner: Iter<'t, K, V>,
}

impl<'t, K, V> Iterator for Keys<'t, K, V> {
	type Item = &'t K;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|(k, _)| k)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}

impl<'t, K, V> DoubleEndedIterator for Keys<'t, K, V> {
	fn next_back(&mut self) -> Option<Self::Item> {
		self.inner.next_back().map(|(k, _)| k)
	}
}

impl<'t, K, V> ExactSizeIterator for Keys<'t, K, V> {}

/// Iterator over values in ascending key order. Created by
/// [`RankTree::values`].
pub struct Values<'t, K, V> {
	inner: Iter<'t, K, V>,
}

impl<'t, K, V> Iterator for Values<'t, K, V> {
	type Item = &'t V;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|(_, v)| v)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}

impl<'t, K, V> DoubleEndedIterator for Values<'t, K, V> {
	fn next_back(&mut self) -> Option<Self::Item> {
		self.inner.next_back().map(|(_, v)| v)
	}
}

impl<'t, K, V> ExactSizeIterator for Values<'t, K, V> {}

impl<K, V> RankTree<K, V> {
	/// Returns an iterator over `(&K, &V)` in ascending key order.
	pub fn iter(&self) -> Iter<'_, K, V> {
		Iter::new(self)
	}

	/// Returns an iterator over keys in ascending order.
	pub fn keys(&self) -> Keys<'_, K, V> {
		Keys { inner: self.iter() }
	}

	/// Returns an iterator over values in ascending key order.
	pub fn values(&self) -> Values<'_, K, V> {
		Values { inner: self.iter() }
	}

	/// Returns a bidirectional [`Cursor`] positioned before the first
	/// entry.
	pub fn cursor(&self) -> Cursor<'_, K, V> {
		Cursor::new(self)
	}
}

impl<K: Ord, V> RankTree<K, V> {
	/// Finds the first node whose key is `>= key`.
	pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<NodeId>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let mut at = self.root_id();
		let mut candidate = None;
		while !at.is_nil() {
			match key.cmp(self.key(at).borrow()) {
				Ordering::Greater => at = self.child_of(at, Side::Right),
				Ordering::Equal => return Some(at),
				Ordering::Less => {
					candidate = Some(at);
					at = self.child_of(at, Side::Left);
				}
			}
		}
		candidate
	}
}
