// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Allocation and teardown of the per-slot arrays.

use std::rc::Rc;

use bindbuf_abi::{INDICATOR_NULL, RawHandle};
use bindbuf_native::{DescriptorKind, Lob, Rowid, Stmt};
use bindbuf_type::{
	Error, NativeKind, Result, Type,
	constants::{MAX_BUFFER_BYTES, NUMBER_AS_TEXT_CHARS},
};
use tracing::{instrument, trace};

use super::Variable;
use crate::{
	alloc::{filled, filled_with, zeroed},
	chunk::DynamicBytes,
	conversion::Conversion,
	data::{BytesRef, Data, DataValue, Region},
	reference::{Reference, ReferenceTracker},
};

/// Types whose slots hold a native handle or descriptor instead of a value.
pub(crate) fn uses_handles(r#type: Type) -> bool {
	r#type.info().requires_handle || r#type.is_timestamp() || r#type.is_interval()
}

impl Variable {
	pub(crate) fn init_buffers(&mut self) -> Result<()> {
		self.allocate_buffers()?;
		self.extended_initialize()
	}

	/// Width of one slot's region in the number-as-text scratch area.
	pub(crate) fn scratch_width(&self) -> usize {
		let width = NUMBER_AS_TEXT_CHARS as usize;
		if self.env.config().utf16 {
			width * 2
		} else {
			width
		}
	}

	pub(crate) fn allocate_buffers(&mut self) -> Result<()> {
		let capacity = self.capacity as usize;
		let r#type = self.info.r#type;

		if self.is_dynamic {
			if self.buffers.dynamic.is_none() {
				self.buffers.dynamic = Some(filled_with(capacity, DynamicBytes::default, "allocate dynamic bytes")?);
			}
		} else {
			let length = u64::from(self.capacity) * u64::from(self.size_in_bytes);
			if length > MAX_BUFFER_BYTES {
				return Err(Error::ArraySizeTooBig {
					capacity: self.capacity,
					size_in_bytes: self.size_in_bytes,
				});
			}
			if uses_handles(r#type) {
				if self.buffers.handles.is_none() {
					self.buffers.handles = Some(filled(capacity, RawHandle::null(), "allocate handles")?);
				}
			} else if self.buffers.values.is_none() {
				self.buffers.values = Some(zeroed(length as usize, "allocate buffer")?);
			}
		}

		if self.conversion == Conversion::LobAsBytes && self.buffers.staging.is_none() {
			self.buffers.staging = Some(filled_with(capacity, DynamicBytes::default, "allocate staging bytes")?);
		}
		if self.buffers.indicator.is_none() {
			self.buffers.indicator = Some(filled(capacity, INDICATOR_NULL, "allocate indicator")?);
		}
		if !self.is_dynamic && self.buffers.actual_length.is_none() {
			self.buffers.actual_length = Some(filled(capacity, self.size_in_bytes, "allocate actual length")?);
		}
		if self.info.default_native == NativeKind::Bytes && !self.is_dynamic && self.buffers.return_code.is_none() {
			self.buffers.return_code = Some(filled(capacity, 0u16, "allocate return code")?);
		}
		let scratch_width = if self.conversion == Conversion::NumberAsText {
			let width = self.scratch_width();
			if self.buffers.scratch.is_none() {
				self.buffers.scratch = Some(zeroed(width * capacity, "allocate temp buffer")?);
			}
			Some(width)
		} else {
			None
		};
		if self.buffers.cells.is_none() {
			self.buffers.cells = Some(filled_with(capacity, Data::null, "allocate external data")?);
		}

		if self.native == NativeKind::Bytes {
			let size = self.size_in_bytes as usize;
			let fixed = self.buffers.values.is_some() && self.buffers.dynamic.is_none();
			let charset = self.info.charset_form;
			let encoding = Rc::clone(&self.encoding);
			for (slot, cell) in self.cell_array().iter_mut().enumerate() {
				let region = match scratch_width {
					Some(width) => Region::Scratch {
						offset: slot * width,
					},
					None if fixed => Region::Fixed {
						offset: slot * size,
					},
					None => Region::Unset,
				};
				cell.value = DataValue::Bytes(BytesRef {
					region,
					length: 0,
					charset,
					encoding: Rc::clone(&encoding),
				});
			}
		}
		Ok(())
	}

	fn cell_array(&mut self) -> &mut [Data] {
		self.buffers.cells.as_deref_mut().unwrap_or_default()
	}

	fn extended_initialize(&mut self) -> Result<()> {
		let r#type = self.info.r#type;
		if self.info.requires_handle && !self.is_dynamic && self.buffers.references.is_none() {
			self.buffers.references = Some(ReferenceTracker::new(self.capacity as usize)?);
		}

		if r#type.is_timestamp() || r#type.is_interval() {
			let Some(kind) = DescriptorKind::for_type(r#type) else {
				return Ok(());
			};
			let descriptors = self
				.env
				.native()
				.alloc_descriptors(kind, self.capacity)
				.map_err(|err| Error::native("allocate descriptors", err))?;
			if let Some(handles) = self.buffers.handles.as_deref_mut() {
				let count = descriptors.len().min(handles.len());
				handles[..count].copy_from_slice(&descriptors[..count]);
			}
			self.buffers.descriptors = Some(kind);
			return Ok(());
		}

		match r#type {
			Type::Clob | Type::NClob | Type::Blob | Type::BFile | Type::Stmt | Type::Rowid => self.pre_fetch(),
			Type::Object => {
				if self.object_type.is_none() {
					return Err(Error::NoObjectType);
				}
				if self.buffers.object_indicator.is_none() {
					self.buffers.object_indicator =
						Some(filled(self.capacity as usize, std::ptr::null_mut(), "allocate object indicator")?);
				}
				self.pre_fetch()
			}
			_ => Ok(()),
		}
	}

	/// Prepares every slot to receive a fresh value from an execute or
	/// fetch, releasing handles held from the previous one.
	#[instrument(name = "var::pre_fetch", level = "trace", skip(self), fields(wire = %self.info.r#type))]
	pub fn pre_fetch(&mut self) -> Result<()> {
		if self.is_dynamic {
			for bytes in self.buffers.dynamic.iter_mut().flatten() {
				bytes.reset();
			}
			return Ok(());
		}

		let r#type = self.info.r#type;
		if !self.info.requires_handle {
			return Ok(());
		}
		let env = Rc::clone(&self.env);
		let temporary = self.conversion == Conversion::LobAsBytes;
		for slot in 0..self.capacity as usize {
			self.tracker_mut()?.clear(slot);
			if let Some(handles) = self.buffers.handles.as_deref_mut() {
				handles[slot] = RawHandle::null();
			}
			if self.native != NativeKind::Bytes {
				self.cell_mut(slot).value = DataValue::Empty;
			}

			let reference = match r#type {
				Type::Stmt => Reference::Stmt(Stmt::allocate(&env)?),
				Type::Rowid => Reference::Rowid(Rowid::allocate(&env)?),
				Type::Object => {
					if let Some(indicators) = self.buffers.object_indicator.as_deref_mut() {
						indicators[slot] = std::ptr::null_mut();
					}
					continue;
				}
				lob => Reference::Lob(Lob::allocate(&env, lob)?),
			};
			self.publish(slot, &reference);
			self.tracker_mut()?.adopt(slot, reference);
			if temporary && let Some(lob) = self.tracker_mut()?.lob(slot) {
				lob.create_temporary()?;
			}
		}
		trace!(slots = self.capacity, "prepared handles");
		Ok(())
	}

	/// Writes the handle's native value into the handle array and, unless
	/// the slot's cell carries bytes, into the cell.
	pub(crate) fn publish(&mut self, slot: usize, reference: &Reference) {
		if let Some(handles) = self.buffers.handles.as_deref_mut() {
			handles[slot] = reference.raw();
		}
		if let Reference::Object(object) = reference
			&& let Some(indicators) = self.buffers.object_indicator.as_deref_mut()
		{
			indicators[slot] = object.indicator();
		}
		if self.native != NativeKind::Bytes {
			self.cell_mut(slot).value = reference.publish();
		}
	}

	/// Frees every per-slot array. Absent arrays are skipped, so this is
	/// safe on partially built or already finalized variables.
	pub(crate) fn finalize_buffers(&mut self) {
		let mut buffers = std::mem::take(&mut self.buffers);
		if let Some(references) = buffers.references.as_mut() {
			references.clear_all();
		}
		if let (Some(kind), Some(handles)) = (buffers.descriptors, buffers.handles.as_deref()) {
			self.env.native().free_descriptors(kind, handles);
		}
	}
}

#[cfg(test)]
pub mod tests {
	use bindbuf_native::ObjectType;
	use bindbuf_testing::{MockNative, environment, environment_with};
	use bindbuf_type::EnvConfig;

	use super::*;
	use crate::VarSpec;

	#[test]
	fn test_fixed_bytes_layout() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let var = Variable::allocate(&env, VarSpec::of(Type::Varchar, 3).size_in_bytes(12)).unwrap();
		let buffers = &var.buffers;
		assert_eq!(buffers.values.as_ref().unwrap().len(), 36);
		assert_eq!(buffers.indicator.as_deref().unwrap(), &[INDICATOR_NULL; 3]);
		assert_eq!(buffers.actual_length.as_deref().unwrap(), &[12; 3]);
		assert_eq!(buffers.return_code.as_deref().unwrap(), &[0; 3]);
		assert!(buffers.dynamic.is_none());
		assert!(buffers.scratch.is_none());

		let (_, cells) = var.get_data();
		let DataValue::Bytes(bytes) = &cells[2].value else {
			panic!("expected byte cell");
		};
		assert_eq!(
			bytes.region,
			Region::Fixed {
				offset: 24
			}
		);
	}

	#[test]
	fn test_dynamic_layout() {
		let mock = MockNative::new();
		let env = environment_with(&mock, EnvConfig::new().max_basic_buffer_size(64));
		let var = Variable::allocate(&env, VarSpec::of(Type::LongRaw, 2).size(1000)).unwrap();
		let buffers = &var.buffers;
		assert_eq!(buffers.dynamic.as_ref().unwrap().len(), 2);
		assert!(buffers.values.is_none());
		assert!(buffers.actual_length.is_none());
		assert!(buffers.return_code.is_none());

		let (_, cells) = var.get_data();
		let DataValue::Bytes(bytes) = &cells[1].value else {
			panic!("expected byte cell");
		};
		assert_eq!(bytes.region, Region::Unset);
	}

	#[test]
	fn test_number_as_text_scratch() {
		let mock = MockNative::new();
		let env = environment_with(&mock, EnvConfig::new().utf16(true));
		let var = Variable::allocate(&env, VarSpec::new(Type::Number, NativeKind::Bytes, 2)).unwrap();
		assert_eq!(var.buffers.scratch.as_ref().unwrap().len(), 2 * 2 * NUMBER_AS_TEXT_CHARS as usize);
		assert!(var.buffers.return_code.is_none());

		let (_, cells) = var.get_data();
		let DataValue::Bytes(bytes) = &cells[1].value else {
			panic!("expected byte cell");
		};
		assert_eq!(
			bytes.region,
			Region::Scratch {
				offset: 2 * NUMBER_AS_TEXT_CHARS as usize
			}
		);
	}

	#[test]
	fn test_array_size_too_big() {
		let mock = MockNative::new();
		let env = environment_with(&mock, EnvConfig::new().max_basic_buffer_size(u32::MAX));
		let err = Variable::allocate(&env, VarSpec::of(Type::Raw, 1 << 20).size(1 << 12)).unwrap_err();
		assert_eq!(
			err,
			Error::ArraySizeTooBig {
				capacity: 1 << 20,
				size_in_bytes: 1 << 12
			}
		);
	}

	#[test]
	fn test_descriptor_types_allocate_per_slot() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let var = Variable::allocate(&env, VarSpec::of(Type::IntervalYm, 4)).unwrap();
		assert_eq!(mock.live_descriptors_of(DescriptorKind::IntervalYm), 4);
		assert!(var.buffers.handles.as_ref().unwrap().iter().all(|handle| !handle.is_null()));
		drop(var);
		assert_eq!(mock.live_descriptors(), 0);
	}

	#[test]
	fn test_handle_types_pre_fetch_on_allocate() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let var = Variable::allocate(&env, VarSpec::of(Type::Stmt, 3)).unwrap();
		assert_eq!(mock.live_statements(), 3);
		let tracker = var.references().unwrap();
		for slot in 0..3 {
			assert_eq!(var.handle(slot), tracker.stmt(slot).unwrap().handle());
		}
		drop(var);
		assert_eq!(mock.live_statements(), 0);
	}

	#[test]
	fn test_pre_fetch_replaces_handles() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut var = Variable::allocate(&env, VarSpec::of(Type::Blob, 2)).unwrap();
		let first = std::rc::Rc::clone(var.references().unwrap().lob(0).unwrap());

		var.pre_fetch().unwrap();
		assert_eq!(std::rc::Rc::strong_count(&first), 1);
		assert!(!std::rc::Rc::ptr_eq(&first, var.references().unwrap().lob(0).unwrap()));
		drop(first);
		assert_eq!(mock.live_descriptors_of(DescriptorKind::Lob), 2);
	}

	#[test]
	fn test_object_requires_type() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let err = Variable::allocate(&env, VarSpec::of(Type::Object, 1)).unwrap_err();
		assert_eq!(err, Error::NoObjectType);

		let object_type = ObjectType::new("HR", "ADDRESS", RawHandle::from_addr(0x10));
		let var = Variable::allocate(&env, VarSpec::of(Type::Object, 2).object_type(object_type)).unwrap();
		assert_eq!(var.buffers.object_indicator.as_deref().unwrap(), &[std::ptr::null_mut(); 2]);
		assert_eq!(mock.live_objects(), 0);
	}

	#[test]
	fn test_failed_allocation_releases_partial_state() {
		let mock = MockNative::new();
		let env = environment(&mock);
		mock.fail_after(2);
		let err = Variable::allocate(&env, VarSpec::of(Type::Rowid, 4)).unwrap_err();
		assert!(matches!(err, Error::Native { .. }));
		assert_eq!(mock.live_resources(), 0);
		assert_eq!(mock.counters().invalid_frees, 0);
	}
}
