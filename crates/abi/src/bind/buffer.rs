// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::ffi::c_void;

/// Position of a piece within a piecewise transfer
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
	One = 0,
	First = 1,
	Next = 2,
	Last = 3,
}

/// Input bind buffer supplied from an in-bind callback
///
/// - `buf` may be null with `alen` zero when there is nothing to send
/// - `ind` points at the slot's null indicator
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InBindBufferFFI {
	pub buf: *mut c_void,
	pub alen: u32,
	pub piece: Piece,
	pub ind: *mut i16,
}

/// Output bind buffer supplied from an out-bind callback
///
/// A null `alen` means the variable keeps no per-slot length; the caller
/// sets the length the native interface provided to `fixed_length` instead.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OutBindBufferFFI {
	pub buf: *mut c_void,
	pub alen: *mut u32,
	pub fixed_length: u32,
	pub piece: Piece,
	pub ind: *mut i16,
	pub rcode: *mut u16,
}

/// Chunk handed to the native interface from a define callback
///
/// `alen` starts at the chunk's capacity; the native interface overwrites it
/// with the number of bytes actually written.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DefineBufferFFI {
	pub buf: *mut c_void,
	pub alen: *mut u32,
	pub ind: *mut i16,
	pub rcode: *mut u16,
}
