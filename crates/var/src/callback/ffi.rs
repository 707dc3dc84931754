// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Entry points registered with the native interface. `ctx` is always the
//! `*mut Variable` passed at bind or define time.
//!
//! Return codes:
//! - `CALLBACK_CONTINUE`: out-parameters were written
//! - `CALLBACK_ERROR`: nothing was written; the error is parked on the
//!   variable unless `ctx` was null

use std::{
	ffi::c_void,
	panic::{AssertUnwindSafe, catch_unwind},
};

use bindbuf_abi::{CALLBACK_CONTINUE, CALLBACK_ERROR, DefineCallbackFn, InBindCallbackFn, OutBindCallbackFn, Piece};
use bindbuf_type::{Error, Result};
use tracing::error;

use crate::variable::Variable;

const _: InBindCallbackFn = in_bind_callback;
const _: OutBindCallbackFn = out_bind_callback;
const _: DefineCallbackFn = define_callback;

fn piece_from_raw(raw: u8) -> Piece {
	match raw {
		1 => Piece::First,
		2 => Piece::Next,
		3 => Piece::Last,
		_ => Piece::One,
	}
}

/// Runs `body` against the variable behind `ctx`, parking any error or
/// panic on it.
///
/// # Safety
/// `ctx` must be null or point at a live `Variable` not otherwise borrowed
/// for the duration of the call.
unsafe fn dispatch(ctx: *mut c_void, name: &'static str, body: impl FnOnce(&mut Variable) -> Result<()>) -> i32 {
	if ctx.is_null() {
		error!(callback = name, "callback invoked without a variable");
		return CALLBACK_ERROR;
	}
	// SAFETY: guaranteed by the caller.
	let variable = unsafe { &mut *ctx.cast::<Variable>() };
	match catch_unwind(AssertUnwindSafe(|| body(&mut *variable))) {
		Ok(Ok(())) => CALLBACK_CONTINUE,
		Ok(Err(err)) => variable.fail(err),
		Err(_) => {
			error!(callback = name, "panic in callback");
			variable.fail(Error::Internal {
				reason: "panic in native callback",
			})
		}
	}
}

/// In-bind callback.
///
/// # Safety
/// `ctx` must be null or a live `*mut Variable`; every out-parameter must be
/// valid for writes.
pub unsafe extern "C" fn in_bind_callback(
	ctx: *mut c_void,
	_bind: *mut c_void,
	_iter: u32,
	index: u32,
	bufpp: *mut *mut c_void,
	alenp: *mut u32,
	piecep: *mut u8,
	indpp: *mut *mut c_void,
) -> i32 {
	// SAFETY: forwarded from this function's contract.
	unsafe {
		dispatch(ctx, "in_bind", |variable| {
			let buffer = variable.in_bind_callback(index)?;
			*bufpp = buffer.buf;
			*alenp = buffer.alen;
			*piecep = buffer.piece as u8;
			*indpp = buffer.ind.cast();
			Ok(())
		})
	}
}

/// Out-bind callback for DML returning.
///
/// # Safety
/// `ctx` must be null or a live `*mut Variable`; `bind` is passed back to the
/// native interface untouched; every out-parameter must be valid for reads
/// and writes.
pub unsafe extern "C" fn out_bind_callback(
	ctx: *mut c_void,
	bind: *mut c_void,
	_iter: u32,
	index: u32,
	bufpp: *mut *mut c_void,
	alenpp: *mut *mut u32,
	piecep: *mut u8,
	indpp: *mut *mut c_void,
	rcodepp: *mut *mut u16,
) -> i32 {
	// SAFETY: forwarded from this function's contract.
	unsafe {
		dispatch(ctx, "out_bind", |variable| {
			let buffer = variable.out_bind_callback(bind, index, piece_from_raw(*piecep))?;
			*bufpp = buffer.buf;
			if !buffer.alen.is_null() {
				*alenpp = buffer.alen;
			} else if buffer.fixed_length > 0 && !(*alenpp).is_null() {
				**alenpp = buffer.fixed_length;
			}
			*piecep = buffer.piece as u8;
			*indpp = buffer.ind.cast();
			if !buffer.rcode.is_null() {
				*rcodepp = buffer.rcode;
			}
			Ok(())
		})
	}
}

/// Define callback for piecewise fetches.
///
/// # Safety
/// `ctx` must be null or a live `*mut Variable`; every out-parameter must be
/// valid for writes.
pub unsafe extern "C" fn define_callback(
	ctx: *mut c_void,
	_define: *mut c_void,
	iter: u32,
	bufpp: *mut *mut c_void,
	alenpp: *mut *mut u32,
	piecep: *mut u8,
	indpp: *mut *mut c_void,
	rcodepp: *mut *mut u16,
) -> i32 {
	// SAFETY: forwarded from this function's contract.
	unsafe {
		dispatch(ctx, "define", |variable| {
			let buffer = variable.define_callback(iter)?;
			*bufpp = buffer.buf;
			*alenpp = buffer.alen;
			*piecep = Piece::Next as u8;
			*indpp = buffer.ind.cast();
			*rcodepp = buffer.rcode;
			Ok(())
		})
	}
}
