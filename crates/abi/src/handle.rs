// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::{ffi::c_void, ptr};

/// Opaque pointer to a resource owned by the native interface: a descriptor,
/// a statement handle, a large object locator or an object instance.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(pub *mut c_void);

impl RawHandle {
	pub const fn null() -> Self {
		Self(ptr::null_mut())
	}

	pub fn is_null(self) -> bool {
		self.0.is_null()
	}

	pub fn as_ptr(self) -> *mut c_void {
		self.0
	}

	/// Address-based handle, for native implementations that hand out
	/// identifiers rather than real pointers.
	pub fn from_addr(addr: usize) -> Self {
		Self(addr as *mut c_void)
	}

	pub fn addr(self) -> usize {
		self.0 as usize
	}
}

impl Default for RawHandle {
	fn default() -> Self {
		Self::null()
	}
}
