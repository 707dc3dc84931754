// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

mod buffer;
mod get;
mod resize;
mod set;

use std::{fmt, rc::Rc};

use bindbuf_abi::RawHandle;
use bindbuf_native::{DescriptorKind, Environment, ObjectType};
use bindbuf_type::{Error, NativeKind, Result, Type, TypeInfo};
use tracing::{debug, instrument};

use crate::{
	chunk::DynamicBytes,
	conversion::Conversion,
	data::Data,
	reference::ReferenceTracker,
};

/// Parameters of a new [`Variable`].
#[derive(Debug, Clone)]
pub struct VarSpec {
	pub r#type: Type,
	pub native: NativeKind,
	pub capacity: u32,
	/// Requested element size, in characters for character data unless
	/// `size_is_bytes` is set.
	pub size: u32,
	pub size_is_bytes: bool,
	pub is_array: bool,
	pub object_type: Option<Rc<ObjectType>>,
}

impl VarSpec {
	pub fn new(r#type: Type, native: NativeKind, capacity: u32) -> Self {
		Self {
			r#type,
			native,
			capacity,
			size: 0,
			size_is_bytes: false,
			is_array: false,
			object_type: None,
		}
	}

	/// Parameters using the type's default native kind.
	pub fn of(r#type: Type, capacity: u32) -> Self {
		Self::new(r#type, r#type.info().default_native, capacity)
	}

	pub fn size(mut self, characters: u32) -> Self {
		self.size = characters;
		self.size_is_bytes = false;
		self
	}

	pub fn size_in_bytes(mut self, bytes: u32) -> Self {
		self.size = bytes;
		self.size_is_bytes = true;
		self
	}

	pub fn array(mut self) -> Self {
		self.is_array = true;
		self
	}

	pub fn object_type(mut self, object_type: Rc<ObjectType>) -> Self {
		self.object_type = Some(object_type);
		self
	}
}

/// Per-slot arrays. Every field is absent until allocated, so teardown can
/// run over a partially built set.
#[derive(Debug, Default)]
pub(crate) struct Buffers {
	pub(crate) values: Option<Vec<u8>>,
	pub(crate) handles: Option<Vec<RawHandle>>,
	/// Kind of the descriptors in `handles` that the variable allocated in
	/// bulk and must free itself.
	pub(crate) descriptors: Option<DescriptorKind>,
	pub(crate) dynamic: Option<Vec<DynamicBytes>>,
	/// Read-back area of byte variables stored in large objects.
	pub(crate) staging: Option<Vec<DynamicBytes>>,
	pub(crate) indicator: Option<Vec<i16>>,
	pub(crate) actual_length: Option<Vec<u32>>,
	pub(crate) return_code: Option<Vec<u16>>,
	pub(crate) scratch: Option<Vec<u8>>,
	pub(crate) object_indicator: Option<Vec<*mut i16>>,
	pub(crate) references: Option<ReferenceTracker>,
	pub(crate) cells: Option<Vec<Data>>,
}

/// Buffers for one bound parameter or fetched column.
pub struct Variable {
	pub(crate) env: Rc<Environment>,
	pub(crate) info: &'static TypeInfo,
	pub(crate) native: NativeKind,
	pub(crate) conversion: Conversion,
	pub(crate) capacity: u32,
	pub(crate) element_count: u32,
	pub(crate) size_in_bytes: u32,
	pub(crate) is_dynamic: bool,
	pub(crate) is_array: bool,
	pub(crate) object_type: Option<Rc<ObjectType>>,
	/// Published on every byte cell.
	pub(crate) encoding: Rc<str>,
	pub(crate) buffers: Buffers,
	pub(crate) callback_error: Option<Error>,
}

impl Variable {
	#[instrument(name = "var::allocate", level = "trace", skip(env, spec), fields(wire = %spec.r#type, capacity = spec.capacity))]
	pub fn allocate(env: &Rc<Environment>, spec: VarSpec) -> Result<Self> {
		let info = spec.r#type.info();
		if spec.capacity == 0 {
			return Err(Error::ArraySizeZero);
		}
		if spec.is_array && !info.can_be_in_array {
			return Err(Error::NotSupported {
				operation: "binding this type as an array",
			});
		}
		let conversion = Conversion::resolve(info, spec.native)?;

		let config = env.config();
		let size = spec.size.max(1);
		let size_in_bytes = if info.size_in_bytes > 0 {
			info.size_in_bytes
		} else if spec.size_is_bytes || !info.is_character_data {
			size
		} else {
			size.saturating_mul(config.bytes_per_character(info.charset_form))
		};
		let is_dynamic = size_in_bytes > config.max_basic_buffer_size;
		debug!(size_in_bytes, is_dynamic, "sized variable");

		let mut variable = Self {
			env: Rc::clone(env),
			info,
			native: spec.native,
			conversion,
			capacity: spec.capacity,
			element_count: 0,
			size_in_bytes: if is_dynamic {
				0
			} else {
				size_in_bytes
			},
			is_dynamic,
			is_array: spec.is_array,
			object_type: spec.object_type,
			encoding: Rc::from(config.encoding_for(info.charset_form)),
			buffers: Buffers::default(),
			callback_error: None,
		};
		variable.init_buffers()?;
		Ok(variable)
	}

	pub fn r#type(&self) -> Type {
		self.info.r#type
	}

	pub fn native_kind(&self) -> NativeKind {
		self.native
	}

	pub fn environment(&self) -> &Rc<Environment> {
		&self.env
	}

	pub fn capacity(&self) -> u32 {
		self.capacity
	}

	/// Element size of the fixed value array; 0 for dynamic variables.
	pub fn size_in_bytes(&self) -> u32 {
		self.size_in_bytes
	}

	pub fn is_dynamic(&self) -> bool {
		self.is_dynamic
	}

	pub fn is_array(&self) -> bool {
		self.is_array
	}

	pub fn object_type(&self) -> Option<&Rc<ObjectType>> {
		self.object_type.as_ref()
	}

	/// Number of slots in use when bound as an array.
	pub fn element_count(&self) -> u32 {
		self.element_count
	}

	pub fn set_element_count(&mut self, count: u32) -> Result<()> {
		if count > self.capacity {
			return Err(Error::ArraySizeExceeded {
				capacity: self.capacity,
				position: count,
			});
		}
		self.element_count = count;
		Ok(())
	}

	/// Capacity and the cells of every slot, as last read or written.
	pub fn get_data(&self) -> (u32, &[Data]) {
		(self.capacity, self.buffers.cells.as_deref().unwrap_or_default())
	}

	pub fn references(&self) -> Option<&ReferenceTracker> {
		self.buffers.references.as_ref()
	}

	/// Error raised inside a native callback since the last call.
	pub fn take_callback_error(&mut self) -> Option<Error> {
		self.callback_error.take()
	}

	/// Releases every buffer and handle. Safe to call more than once; the
	/// variable is unusable afterwards.
	#[instrument(name = "var::release", level = "trace", skip(self))]
	pub fn release(&mut self) {
		self.finalize_buffers();
		self.object_type = None;
	}

	pub(crate) fn check_slot(&self, slot: u32) -> Result<usize> {
		if self.buffers.cells.is_none() {
			return Err(Error::InvalidHandle {
				expected: "variable",
			});
		}
		if slot >= self.capacity {
			return Err(Error::ArraySizeExceeded {
				capacity: self.capacity,
				position: slot,
			});
		}
		Ok(slot as usize)
	}

	pub(crate) fn check_native(&self, native: NativeKind, operation: &'static str) -> Result<()> {
		if self.native == native {
			Ok(())
		} else {
			Err(Error::NotSupported {
				operation,
			})
		}
	}

	pub(crate) fn values(&self) -> &[u8] {
		self.buffers.values.as_deref().unwrap_or_default()
	}

	pub(crate) fn element(&self, slot: usize) -> &[u8] {
		let size = self.size_in_bytes as usize;
		&self.values()[slot * size..][..size]
	}

	pub(crate) fn element_mut(&mut self, slot: usize) -> &mut [u8] {
		let size = self.size_in_bytes as usize;
		let values = self.buffers.values.as_deref_mut().unwrap_or_default();
		&mut values[slot * size..][..size]
	}

	pub(crate) fn handle(&self, slot: usize) -> RawHandle {
		self.buffers.handles.as_deref().and_then(|handles| handles.get(slot).copied()).unwrap_or_default()
	}

	pub(crate) fn tracker_mut(&mut self) -> Result<&mut ReferenceTracker> {
		self.buffers.references.as_mut().ok_or(Error::NotSupported {
			operation: "holding handles",
		})
	}

	pub(crate) fn cell_mut(&mut self, slot: usize) -> &mut Data {
		&mut self.buffers.cells.as_deref_mut().unwrap_or_default()[slot]
	}

	pub(crate) fn set_indicator(&mut self, slot: usize, indicator: i16) {
		if let Some(indicators) = self.buffers.indicator.as_deref_mut() {
			indicators[slot] = indicator;
		}
	}

	pub(crate) fn quantum(&self) -> u32 {
		self.env.config().chunk_size
	}
}

impl Drop for Variable {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Variable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Variable")
			.field("type", &self.info.r#type)
			.field("native", &self.native)
			.field("capacity", &self.capacity)
			.field("size_in_bytes", &self.size_in_bytes)
			.field("is_dynamic", &self.is_dynamic)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
pub mod tests {
	use bindbuf_testing::{MockNative, environment, environment_with};
	use bindbuf_type::EnvConfig;

	use super::*;

	#[test]
	fn test_zero_capacity() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let err = Variable::allocate(&env, VarSpec::of(Type::Varchar, 0).size(10)).unwrap_err();
		assert_eq!(err, Error::ArraySizeZero);
		assert_eq!(mock.live_resources(), 0);
	}

	#[test]
	fn test_array_not_supported() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let err = Variable::allocate(&env, VarSpec::of(Type::Clob, 3).array()).unwrap_err();
		assert!(matches!(err, Error::NotSupported { .. }));
		assert!(Variable::allocate(&env, VarSpec::of(Type::NativeInt, 3).array()).is_ok());
	}

	#[test]
	fn test_unhandled_conversion_allocates_nothing() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let err = Variable::allocate(&env, VarSpec::new(Type::Date, NativeKind::Double, 2)).unwrap_err();
		assert_eq!(
			err,
			Error::UnhandledConversion {
				wire: Type::Date,
				native: NativeKind::Double
			}
		);
		assert_eq!(mock.counters().descriptors_allocated, 0);
	}

	#[test]
	fn test_character_sizing() {
		let mock = MockNative::new();
		let env = environment_with(&mock, EnvConfig::new().max_bytes_per_character(3).nmax_bytes_per_character(2));

		let var = Variable::allocate(&env, VarSpec::of(Type::Varchar, 1).size(10)).unwrap();
		assert_eq!(var.size_in_bytes(), 30);
		let var = Variable::allocate(&env, VarSpec::of(Type::NVarchar, 1).size(10)).unwrap();
		assert_eq!(var.size_in_bytes(), 20);
		let var = Variable::allocate(&env, VarSpec::of(Type::Varchar, 1).size_in_bytes(10)).unwrap();
		assert_eq!(var.size_in_bytes(), 10);
		let var = Variable::allocate(&env, VarSpec::of(Type::Raw, 1).size(10)).unwrap();
		assert_eq!(var.size_in_bytes(), 10);
		let var = Variable::allocate(&env, VarSpec::of(Type::Raw, 1)).unwrap();
		assert_eq!(var.size_in_bytes(), 1);
		let var = Variable::allocate(&env, VarSpec::of(Type::Number, 1).size(100)).unwrap();
		assert_eq!(var.size_in_bytes(), 22);
	}

	#[test]
	fn test_dynamic_threshold() {
		let mock = MockNative::new();
		let env = environment_with(&mock, EnvConfig::new().max_basic_buffer_size(100));

		let var = Variable::allocate(&env, VarSpec::of(Type::Raw, 4).size(100)).unwrap();
		assert!(!var.is_dynamic());
		let var = Variable::allocate(&env, VarSpec::of(Type::Raw, 4).size(101)).unwrap();
		assert!(var.is_dynamic());
		assert_eq!(var.size_in_bytes(), 0);
	}

	#[test]
	fn test_element_count() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut var = Variable::allocate(&env, VarSpec::of(Type::NativeInt, 4).array()).unwrap();
		assert_eq!(var.element_count(), 0);
		var.set_element_count(4).unwrap();
		assert_eq!(var.element_count(), 4);
		assert_eq!(
			var.set_element_count(5).unwrap_err(),
			Error::ArraySizeExceeded {
				capacity: 4,
				position: 5
			}
		);
		assert_eq!(var.element_count(), 4);
	}

	#[test]
	fn test_get_data_starts_null() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let var = Variable::allocate(&env, VarSpec::of(Type::Varchar, 3).size(8)).unwrap();
		let (capacity, cells) = var.get_data();
		assert_eq!(capacity, 3);
		assert_eq!(cells.len(), 3);
		assert!(cells.iter().all(|cell| cell.is_null));
	}

	#[test]
	fn test_release_is_idempotent() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut var = Variable::allocate(&env, VarSpec::of(Type::TimestampTz, 3)).unwrap();
		assert_eq!(mock.live_descriptors(), 3);
		var.release();
		var.release();
		assert_eq!(mock.live_descriptors(), 0);
		assert_eq!(mock.counters().invalid_frees, 0);
		assert_eq!(
			var.check_slot(0).unwrap_err(),
			Error::InvalidHandle {
				expected: "variable"
			}
		);
		drop(var);
		assert_eq!(mock.counters().descriptors_freed, 3);
	}
}
