// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::{ffi::c_void, ptr};

/// Per-slot arrays of a variable bound or defined statically
///
/// Any pointer may be null when the variable does not keep that array.
/// `object_indicators` holds one pointer per slot to the indicator
/// structure of the object instance stored in `value`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BindArraysFFI {
	pub value: *mut c_void,
	pub element_size: u32,
	pub indicator: *mut i16,
	pub actual_length: *mut u32,
	pub return_code: *mut u16,
	pub object_indicators: *mut *mut c_void,
	pub max_elements: u32,
	pub current_elements: *mut u32,
}

impl BindArraysFFI {
	pub const fn empty() -> Self {
		Self {
			value: ptr::null_mut(),
			element_size: 0,
			indicator: ptr::null_mut(),
			actual_length: ptr::null_mut(),
			return_code: ptr::null_mut(),
			object_indicators: ptr::null_mut(),
			max_elements: 0,
			current_elements: ptr::null_mut(),
		}
	}
}
