// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::{
	cell::RefCell,
	collections::{HashMap, HashSet},
	ffi::c_void,
	rc::Rc,
};

use bindbuf_abi::{INDICATOR_NOT_NULL, RawHandle};
use bindbuf_native::{DescriptorKind, NativeInterface, ObjectInstance};
use bindbuf_type::{IntervalDs, IntervalYm, NativeError, Timestamp, Type};

mod codec;

const FIRST_ADDR: usize = 0x1000;
const ADDR_STEP: usize = 0x10;

/// Running totals of resources handed out and taken back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
	pub descriptors_allocated: u32,
	pub descriptors_freed: u32,
	pub statements_allocated: u32,
	pub statements_freed: u32,
	pub objects_created: u32,
	pub objects_freed: u32,
	pub temporary_lobs_created: u32,
	pub temporary_lobs_freed: u32,
	pub lob_reads: u32,
	pub lob_writes: u32,
	/// Frees of handles that were never allocated or already freed
	pub invalid_frees: u32,
}

#[derive(Debug)]
enum Descriptor {
	Timestamp(Timestamp),
	IntervalDs(IntervalDs),
	IntervalYm(IntervalYm),
	Lob(LobState),
	Rowid,
}

#[derive(Debug, Default)]
struct LobState {
	r#type: Option<Type>,
	content: Vec<u8>,
	temporary: bool,
}

#[derive(Debug)]
struct State {
	next_addr: usize,
	descriptors: HashMap<usize, (DescriptorKind, Descriptor)>,
	statements: HashSet<usize>,
	objects: HashMap<usize, Box<i16>>,
	rows_returned: u32,
	allocations_before_failure: Option<u32>,
	counters: Counters,
}

impl Default for State {
	fn default() -> Self {
		Self {
			next_addr: FIRST_ADDR,
			descriptors: HashMap::new(),
			statements: HashSet::new(),
			objects: HashMap::new(),
			rows_returned: 0,
			allocations_before_failure: None,
			counters: Counters::default(),
		}
	}
}

impl State {
	fn next_handle(&mut self) -> RawHandle {
		let addr = self.next_addr;
		self.next_addr += ADDR_STEP;
		RawHandle::from_addr(addr)
	}

	fn allocation_permitted(&mut self) -> Result<(), NativeError> {
		match self.allocations_before_failure {
			Some(0) => {
				self.allocations_before_failure = None;
				Err(NativeError::new(-1, "injected allocation failure"))
			}
			Some(remaining) => {
				self.allocations_before_failure = Some(remaining - 1);
				Ok(())
			}
			None => Ok(()),
		}
	}

	fn descriptor(&mut self, handle: RawHandle) -> Result<&mut Descriptor, NativeError> {
		self.descriptors
			.get_mut(&handle.addr())
			.map(|(_, descriptor)| descriptor)
			.ok_or_else(|| NativeError::new(-2, format!("unknown descriptor {:#x}", handle.addr())))
	}

	fn lob(&mut self, locator: RawHandle) -> Result<&mut LobState, NativeError> {
		match self.descriptor(locator)? {
			Descriptor::Lob(lob) => Ok(lob),
			_ => Err(NativeError::new(-3, "descriptor is not a LOB locator")),
		}
	}
}

/// In-memory stand-in for the native call interface.
///
/// Handles are fake addresses that are never dereferenced, except object
/// indicators which point at real memory owned by the mock.
#[derive(Debug, Default)]
pub struct MockNative {
	state: RefCell<State>,
}

impl MockNative {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	pub fn counters(&self) -> Counters {
		self.state.borrow().counters
	}

	pub fn live_descriptors(&self) -> usize {
		self.state.borrow().descriptors.len()
	}

	pub fn live_descriptors_of(&self, kind: DescriptorKind) -> usize {
		self.state.borrow().descriptors.values().filter(|(k, _)| *k == kind).count()
	}

	pub fn live_statements(&self) -> usize {
		self.state.borrow().statements.len()
	}

	pub fn live_objects(&self) -> usize {
		self.state.borrow().objects.len()
	}

	pub fn live_temporary_lobs(&self) -> usize {
		self.state
			.borrow()
			.descriptors
			.values()
			.filter(|(_, descriptor)| matches!(descriptor, Descriptor::Lob(lob) if lob.temporary))
			.count()
	}

	/// Everything currently allocated and not yet freed.
	pub fn live_resources(&self) -> usize {
		self.live_descriptors() + self.live_statements() + self.live_objects()
	}

	pub fn set_rows_returned(&self, rows: u32) {
		self.state.borrow_mut().rows_returned = rows;
	}

	/// The allocation after the next `successes` ones fails.
	pub fn fail_after(&self, successes: u32) {
		self.state.borrow_mut().allocations_before_failure = Some(successes);
	}

	pub fn lob_content(&self, locator: RawHandle) -> Option<Vec<u8>> {
		self.state.borrow_mut().lob(locator).ok().map(|lob| lob.content.clone())
	}

	pub fn set_lob_content(&self, locator: RawHandle, content: &[u8]) {
		if let Ok(lob) = self.state.borrow_mut().lob(locator) {
			lob.content = content.to_vec();
		}
	}

	/// Object instance as the native interface would produce it during a
	/// fetch: not null and owned by the mock.
	pub fn fetched_object(&self) -> ObjectInstance {
		let mut state = self.state.borrow_mut();
		let instance = state.next_handle();
		let mut indicator = Box::new(INDICATOR_NOT_NULL);
		let ptr: *mut i16 = indicator.as_mut();
		state.objects.insert(instance.addr(), indicator);
		ObjectInstance {
			instance,
			indicator: ptr,
		}
	}
}

impl NativeInterface for MockNative {
	fn alloc_descriptors(&self, kind: DescriptorKind, count: u32) -> Result<Vec<RawHandle>, NativeError> {
		let mut state = self.state.borrow_mut();
		state.allocation_permitted()?;
		let mut handles = Vec::with_capacity(count as usize);
		for _ in 0..count {
			let handle = state.next_handle();
			let descriptor = match kind {
				DescriptorKind::Timestamp | DescriptorKind::TimestampTz | DescriptorKind::TimestampLtz => {
					Descriptor::Timestamp(Timestamp::default())
				}
				DescriptorKind::IntervalDs => Descriptor::IntervalDs(IntervalDs::default()),
				DescriptorKind::IntervalYm => Descriptor::IntervalYm(IntervalYm::default()),
				DescriptorKind::Lob | DescriptorKind::File => Descriptor::Lob(LobState::default()),
				DescriptorKind::Rowid => Descriptor::Rowid,
			};
			state.descriptors.insert(handle.addr(), (kind, descriptor));
			handles.push(handle);
		}
		state.counters.descriptors_allocated += count;
		Ok(handles)
	}

	fn free_descriptors(&self, kind: DescriptorKind, descriptors: &[RawHandle]) {
		let mut state = self.state.borrow_mut();
		for handle in descriptors {
			match state.descriptors.remove(&handle.addr()) {
				Some((allocated, _)) if allocated == kind => state.counters.descriptors_freed += 1,
				_ => state.counters.invalid_frees += 1,
			}
		}
	}

	fn alloc_statement(&self) -> Result<RawHandle, NativeError> {
		let mut state = self.state.borrow_mut();
		state.allocation_permitted()?;
		let handle = state.next_handle();
		state.statements.insert(handle.addr());
		state.counters.statements_allocated += 1;
		Ok(handle)
	}

	fn free_statement(&self, handle: RawHandle) {
		let mut state = self.state.borrow_mut();
		if state.statements.remove(&handle.addr()) {
			state.counters.statements_freed += 1;
		} else {
			state.counters.invalid_frees += 1;
		}
	}

	fn create_temporary_lob(&self, locator: RawHandle, r#type: Type) -> Result<(), NativeError> {
		let mut state = self.state.borrow_mut();
		state.allocation_permitted()?;
		let lob = state.lob(locator)?;
		lob.r#type = Some(r#type);
		lob.content.clear();
		lob.temporary = true;
		state.counters.temporary_lobs_created += 1;
		Ok(())
	}

	fn free_temporary_lob(&self, locator: RawHandle) -> Result<(), NativeError> {
		let mut state = self.state.borrow_mut();
		let lob = state.lob(locator)?;
		if !lob.temporary {
			return Err(NativeError::new(-4, "LOB is not temporary"));
		}
		lob.temporary = false;
		state.counters.temporary_lobs_freed += 1;
		Ok(())
	}

	fn lob_length(&self, locator: RawHandle) -> Result<u64, NativeError> {
		let mut state = self.state.borrow_mut();
		let lob = state.lob(locator)?;
		let length = match lob.r#type {
			Some(Type::Clob | Type::NClob) => match std::str::from_utf8(&lob.content) {
				Ok(text) => text.chars().count(),
				Err(_) => lob.content.len(),
			},
			_ => lob.content.len(),
		};
		Ok(length as u64)
	}

	fn read_lob(&self, locator: RawHandle, offset: u64, _amount: u64, buffer: &mut [u8]) -> Result<u64, NativeError> {
		let mut state = self.state.borrow_mut();
		let lob = state.lob(locator)?;
		let start = (offset.saturating_sub(1) as usize).min(lob.content.len());
		let available = &lob.content[start..];
		let read = available.len().min(buffer.len());
		buffer[..read].copy_from_slice(&available[..read]);
		state.counters.lob_reads += 1;
		Ok(read as u64)
	}

	fn write_lob(&self, locator: RawHandle, data: &[u8]) -> Result<(), NativeError> {
		let mut state = self.state.borrow_mut();
		let lob = state.lob(locator)?;
		lob.content = data.to_vec();
		state.counters.lob_writes += 1;
		Ok(())
	}

	fn rows_returned(&self, _bind: *mut c_void) -> Result<u32, NativeError> {
		Ok(self.state.borrow().rows_returned)
	}

	fn create_object(&self, _type_descriptor: RawHandle) -> Result<ObjectInstance, NativeError> {
		self.state.borrow_mut().allocation_permitted()?;
		let created = self.fetched_object();
		self.state.borrow_mut().counters.objects_created += 1;
		Ok(created)
	}

	fn free_object(&self, instance: RawHandle) {
		let mut state = self.state.borrow_mut();
		if state.objects.remove(&instance.addr()).is_some() {
			state.counters.objects_freed += 1;
		} else {
			state.counters.invalid_frees += 1;
		}
	}
}
