// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Strong ownership of the complex handle held by each slot.

use std::rc::Rc;

use bindbuf_abi::RawHandle;
use bindbuf_native::{Lob, Object, Rowid, Stmt};
use bindbuf_type::Result;

use crate::{alloc::filled, data::DataValue};

#[derive(Debug, Clone)]
pub enum Reference {
	Lob(Rc<Lob>),
	Stmt(Rc<Stmt>),
	Rowid(Rc<Rowid>),
	Object(Rc<Object>),
}

impl Reference {
	/// Same underlying handle, not merely an equal one.
	pub fn is_same(&self, other: &Reference) -> bool {
		match (self, other) {
			(Reference::Lob(a), Reference::Lob(b)) => Rc::ptr_eq(a, b),
			(Reference::Stmt(a), Reference::Stmt(b)) => Rc::ptr_eq(a, b),
			(Reference::Rowid(a), Reference::Rowid(b)) => Rc::ptr_eq(a, b),
			(Reference::Object(a), Reference::Object(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}

	/// Native value the handle publishes into the variable's handle array.
	pub fn raw(&self) -> RawHandle {
		match self {
			Reference::Lob(lob) => lob.locator(),
			Reference::Stmt(stmt) => stmt.handle(),
			Reference::Rowid(rowid) => rowid.handle(),
			Reference::Object(object) => object.instance(),
		}
	}

	pub(crate) fn publish(&self) -> DataValue {
		match self {
			Reference::Lob(lob) => DataValue::Lob(Rc::downgrade(lob)),
			Reference::Stmt(stmt) => DataValue::Stmt(Rc::downgrade(stmt)),
			Reference::Rowid(rowid) => DataValue::Rowid(Rc::downgrade(rowid)),
			Reference::Object(object) => DataValue::Object(Rc::downgrade(object)),
		}
	}
}

/// Borrowed handle offered for a slot; only cloned into a [`Reference`]
/// after the slot's previous reference is gone.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Candidate<'a> {
	Lob(&'a Rc<Lob>),
	Stmt(&'a Rc<Stmt>),
	Rowid(&'a Rc<Rowid>),
	Object(&'a Rc<Object>),
}

impl Candidate<'_> {
	fn is(self, reference: &Reference) -> bool {
		match (self, reference) {
			(Candidate::Lob(a), Reference::Lob(b)) => Rc::ptr_eq(a, b),
			(Candidate::Stmt(a), Reference::Stmt(b)) => Rc::ptr_eq(a, b),
			(Candidate::Rowid(a), Reference::Rowid(b)) => Rc::ptr_eq(a, b),
			(Candidate::Object(a), Reference::Object(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}

	fn acquire(self) -> Reference {
		match self {
			Candidate::Lob(lob) => Reference::Lob(Rc::clone(lob)),
			Candidate::Stmt(stmt) => Reference::Stmt(Rc::clone(stmt)),
			Candidate::Rowid(rowid) => Reference::Rowid(Rc::clone(rowid)),
			Candidate::Object(object) => Reference::Object(Rc::clone(object)),
		}
	}
}

/// One optional strong reference per slot.
#[derive(Debug)]
pub struct ReferenceTracker {
	slots: Vec<Option<Reference>>,
}

impl ReferenceTracker {
	pub(crate) fn new(capacity: usize) -> Result<Self> {
		Ok(Self {
			slots: filled(capacity, None, "allocate references")?,
		})
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	pub fn get(&self, slot: usize) -> Option<&Reference> {
		self.slots.get(slot).and_then(Option::as_ref)
	}

	pub fn lob(&self, slot: usize) -> Option<&Rc<Lob>> {
		match self.get(slot) {
			Some(Reference::Lob(lob)) => Some(lob),
			_ => None,
		}
	}

	pub fn stmt(&self, slot: usize) -> Option<&Rc<Stmt>> {
		match self.get(slot) {
			Some(Reference::Stmt(stmt)) => Some(stmt),
			_ => None,
		}
	}

	pub fn rowid(&self, slot: usize) -> Option<&Rc<Rowid>> {
		match self.get(slot) {
			Some(Reference::Rowid(rowid)) => Some(rowid),
			_ => None,
		}
	}

	pub fn object(&self, slot: usize) -> Option<&Rc<Object>> {
		match self.get(slot) {
			Some(Reference::Object(object)) => Some(object),
			_ => None,
		}
	}

	/// Makes `candidate` the slot's reference. Returns `false` without
	/// touching anything when it already is.
	pub(crate) fn assign(&mut self, slot: usize, candidate: Candidate<'_>) -> bool {
		if let Some(current) = &self.slots[slot]
			&& candidate.is(current)
		{
			return false;
		}
		self.slots[slot] = None;
		self.slots[slot] = Some(candidate.acquire());
		true
	}

	/// Stores a freshly created handle. The slot must have been cleared.
	pub(crate) fn adopt(&mut self, slot: usize, reference: Reference) {
		debug_assert!(self.slots[slot].is_none());
		self.slots[slot] = Some(reference);
	}

	pub(crate) fn clear(&mut self, slot: usize) {
		self.slots[slot] = None;
	}

	pub(crate) fn clear_all(&mut self) {
		for slot in self.slots.iter_mut() {
			*slot = None;
		}
	}
}

#[cfg(test)]
pub mod tests {
	use bindbuf_testing::{MockNative, environment};
	use bindbuf_type::Type;

	use super::*;

	#[test]
	fn test_assign_different_handle_releases_previous() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let first = Lob::allocate(&env, Type::Blob).unwrap();
		let second = Lob::allocate(&env, Type::Blob).unwrap();
		let mut tracker = ReferenceTracker::new(2).unwrap();

		assert!(tracker.assign(0, Candidate::Lob(&first)));
		assert_eq!(Rc::strong_count(&first), 2);

		assert!(tracker.assign(0, Candidate::Lob(&second)));
		assert_eq!(Rc::strong_count(&first), 1);
		assert_eq!(Rc::strong_count(&second), 2);
		assert!(Rc::ptr_eq(tracker.lob(0).unwrap(), &second));
	}

	#[test]
	fn test_assign_same_handle_is_noop() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let stmt = Stmt::allocate(&env).unwrap();
		let mut tracker = ReferenceTracker::new(1).unwrap();

		assert!(tracker.assign(0, Candidate::Stmt(&stmt)));
		assert!(!tracker.assign(0, Candidate::Stmt(&stmt)));
		assert_eq!(Rc::strong_count(&stmt), 2);
	}

	#[test]
	fn test_clear_all_frees_owned_handles() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut tracker = ReferenceTracker::new(3).unwrap();
		for slot in 0..3 {
			tracker.adopt(slot, Reference::Rowid(Rowid::allocate(&env).unwrap()));
		}
		assert_eq!(mock.live_descriptors(), 3);

		tracker.clear(1);
		assert_eq!(mock.live_descriptors(), 2);
		assert!(tracker.rowid(1).is_none());

		tracker.clear_all();
		assert_eq!(mock.live_descriptors(), 0);
		assert_eq!(mock.counters().invalid_frees, 0);
	}

	#[test]
	fn test_published_cell_is_weak() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let reference = Reference::Stmt(Stmt::allocate(&env).unwrap());
		let DataValue::Stmt(weak) = reference.publish() else {
			panic!("expected statement cell");
		};
		assert_eq!(weak.strong_count(), 1);
		drop(reference);
		assert!(weak.upgrade().is_none());
		assert_eq!(mock.live_statements(), 0);
	}
}
