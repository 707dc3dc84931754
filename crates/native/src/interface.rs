// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::ffi::c_void;

use bindbuf_abi::RawHandle;
use bindbuf_type::{NativeError, Type};

use crate::codec::Codec;

/// Kinds of descriptor the native interface allocates in bulk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
	Timestamp,
	TimestampTz,
	TimestampLtz,
	IntervalDs,
	IntervalYm,
	Lob,
	File,
	Rowid,
}

impl DescriptorKind {
	/// Descriptor backing each slot of a variable of the given type, if the
	/// type is carried by descriptors at all.
	pub fn for_type(r#type: Type) -> Option<Self> {
		match r#type {
			Type::Timestamp => Some(DescriptorKind::Timestamp),
			Type::TimestampTz => Some(DescriptorKind::TimestampTz),
			Type::TimestampLtz => Some(DescriptorKind::TimestampLtz),
			Type::IntervalDs => Some(DescriptorKind::IntervalDs),
			Type::IntervalYm => Some(DescriptorKind::IntervalYm),
			Type::Clob | Type::NClob | Type::Blob => Some(DescriptorKind::Lob),
			Type::BFile => Some(DescriptorKind::File),
			Type::Rowid => Some(DescriptorKind::Rowid),
			_ => None,
		}
	}
}

/// Object instance together with its null indicator structure.
#[derive(Debug, Clone, Copy)]
pub struct ObjectInstance {
	pub instance: RawHandle,
	pub indicator: *mut i16,
}

/// Operations the buffer manager needs from the native call interface.
///
/// Implementations are used single threaded through `Rc<dyn NativeInterface>`.
pub trait NativeInterface: Codec {
	fn alloc_descriptors(&self, kind: DescriptorKind, count: u32) -> Result<Vec<RawHandle>, NativeError>;

	fn free_descriptors(&self, kind: DescriptorKind, descriptors: &[RawHandle]);

	fn alloc_statement(&self) -> Result<RawHandle, NativeError>;

	fn free_statement(&self, handle: RawHandle);

	/// Makes the locator refer to a new, empty temporary large object.
	fn create_temporary_lob(&self, locator: RawHandle, r#type: Type) -> Result<(), NativeError>;

	fn free_temporary_lob(&self, locator: RawHandle) -> Result<(), NativeError>;

	/// Length in characters for character large objects, bytes otherwise.
	fn lob_length(&self, locator: RawHandle) -> Result<u64, NativeError>;

	/// Reads up to `amount` units starting at the one-based `offset` and
	/// returns the number of bytes placed in `buffer`.
	fn read_lob(&self, locator: RawHandle, offset: u64, amount: u64, buffer: &mut [u8]) -> Result<u64, NativeError>;

	/// Replaces the whole content of the large object.
	fn write_lob(&self, locator: RawHandle, data: &[u8]) -> Result<(), NativeError>;

	/// Number of rows a DML returning statement produced for the bind.
	fn rows_returned(&self, bind: *mut c_void) -> Result<u32, NativeError>;

	fn create_object(&self, type_descriptor: RawHandle) -> Result<ObjectInstance, NativeError>;

	fn free_object(&self, instance: RawHandle);
}
