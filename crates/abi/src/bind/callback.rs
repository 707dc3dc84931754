// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::ffi::c_void;

/// Supplies the buffer for one input row during execute
///
/// # Parameters
/// - `ctx`: the variable registered with the bind
/// - `bind`: native bind handle
/// - `iter`: execute iteration
/// - `index`: row within the iteration
/// - `bufpp`, `alenp`, `piecep`, `indpp`: receive buffer, length, piece and indicator
///
/// # Returns
/// - `CALLBACK_CONTINUE` on success, `CALLBACK_ERROR` on failure
pub type InBindCallbackFn = unsafe extern "C" fn(
	ctx: *mut c_void,
	bind: *mut c_void,
	iter: u32,
	index: u32,
	bufpp: *mut *mut c_void,
	alenp: *mut u32,
	piecep: *mut u8,
	indpp: *mut *mut c_void,
) -> i32;

/// Supplies the buffer for one returned row of a DML returning statement
///
/// On the first row of an execution the variable may grow to fit the
/// number of rows the statement returned.
///
/// # Returns
/// - `CALLBACK_CONTINUE` on success, `CALLBACK_ERROR` on failure
pub type OutBindCallbackFn = unsafe extern "C" fn(
	ctx: *mut c_void,
	bind: *mut c_void,
	iter: u32,
	index: u32,
	bufpp: *mut *mut c_void,
	alenpp: *mut *mut u32,
	piecep: *mut u8,
	indpp: *mut *mut c_void,
	rcodepp: *mut *mut u16,
) -> i32;

/// Supplies the next chunk for a piecewise fetched column value
///
/// # Returns
/// - `CALLBACK_CONTINUE` on success, `CALLBACK_ERROR` on failure
pub type DefineCallbackFn = unsafe extern "C" fn(
	ctx: *mut c_void,
	define: *mut c_void,
	iter: u32,
	bufpp: *mut *mut c_void,
	alenpp: *mut *mut u32,
	piecep: *mut u8,
	indpp: *mut *mut c_void,
	rcodepp: *mut *mut u16,
) -> i32;
