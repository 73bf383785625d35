//! Diagnostic rendering of tree structure.

use crate::alloc::{NodeId, Side};
use crate::RankTree;
use smallvec::SmallVec;
use std::fmt;
use std::fmt::Write;

impl<K: fmt::Debug, V> RankTree<K, V> {
	/// Renders the tree sideways for tests and debugging: one node per
	/// line, larger keys above smaller ones, children indented under
	/// their parent. Each line shows the key, the balance factor and the
	/// left/right subtree cardinalities, plus the node's slot index so
	/// output can be correlated with checker errors.
	///
	/// ```text
	/// 	"07"  b:0  l:0 r:0  #4
	/// "05"  b:+1  l:0 r:1  #2
	/// 	"03"  b:0  l:0 r:0  #1
	/// ```
	///
	/// Not intended for production callers; the format is unstable.
	pub fn dump(&self) -> String {
		let mut out = String::new();
		if self.root_id().is_nil() {
			out.push_str("(empty)\n");
			return out;
		}

		// Reverse symmetric order (right subtree first) prints the tree
		// sideways with the root flush left.
		let mut stack: SmallVec<[(NodeId, usize); 32]> = SmallVec::new();
		let mut at = self.root_id();
		let mut depth = 0usize;
		loop {
			while !at.is_nil() {
				stack.push((at, depth));
				at = self.child_of(at, Side::Right);
				depth += 1;
			}
			let (id, d) = match stack.pop() {
				Some(top) => top,
				None => break,
			};
			self.dump_line(&mut out, id, d);
			at = self.child_of(id, Side::Left);
			depth = d + 1;
		}
		out
	}

	fn dump_line(&self, out: &mut String, id: NodeId, depth: usize) {
		for _ in 0..depth {
			out.push('\t');
		}
		let slot = self.arena.slot(id);
		let _ = writeln!(
			out,
			"{:?}  b:{}{}  l:{} r:{}  #{}",
			slot.key(),
			if slot.balance >= 0 { "+" } else { "" },
			slot.balance,
			slot.counts[Side::Left as usize],
			slot.counts[Side::Right as usize],
			id.0,
		);
	}
}
