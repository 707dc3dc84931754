// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Buffer pointers handed to the native interface during execute and fetch.
//!
//! The safe methods on [`Variable`] compute what each callback must return.
//! The `extern "C"` functions in [`ffi`] are the entry points registered with
//! the native interface; they forward to these methods and write the
//! results through the out-parameters.

pub mod ffi;

use std::{ffi::c_void, ptr};

use bindbuf_abi::{BindArraysFFI, CALLBACK_ERROR, DefineBufferFFI, InBindBufferFFI, OutBindBufferFFI, Piece};
use bindbuf_type::{Error, Result, Type};
use tracing::{debug, warn};

use crate::variable::Variable;

impl Variable {
	/// Buffer for input row `index`. A dynamic slot with nothing written
	/// yields a null buffer of length zero.
	pub fn in_bind_callback(&mut self, index: u32) -> Result<InBindBufferFFI> {
		let slot = self.check_slot(index)?;
		let (buf, alen) = if self.is_dynamic {
			match self.buffers.dynamic.as_deref_mut().and_then(|dynamic| dynamic[slot].first_mut()) {
				Some(chunk) => (chunk.buffer_ptr(), chunk.length()),
				None => (ptr::null_mut(), 0),
			}
		} else {
			let alen = match self.buffers.actual_length.as_deref() {
				Some(lengths) => lengths[slot],
				None => self.info.size_in_bytes,
			};
			(self.callback_buffer(slot), alen)
		};
		Ok(InBindBufferFFI {
			buf,
			alen,
			piece: Piece::One,
			ind: self.indicator_ptr(slot),
		})
	}

	/// Buffer for returned row `index` of a DML returning statement. The
	/// first row of an execution asks the native interface how many rows
	/// came back and regrows the variable when they do not fit.
	///
	/// `piece` is the position the native interface reported for this
	/// request; a dynamic slot starts over on the first piece of a value.
	pub fn out_bind_callback(&mut self, bind: *mut c_void, index: u32, piece: Piece) -> Result<OutBindBufferFFI> {
		if index == 0 {
			let rows = self
				.env
				.native()
				.rows_returned(bind)
				.map_err(|err| Error::native("get rows returned", err))?;
			if rows > self.capacity {
				self.grow(rows)?;
			}
		}
		let slot = self.check_slot(index)?;

		if self.is_dynamic {
			let quantum = self.quantum();
			let dynamic = self.buffers.dynamic.as_deref_mut().unwrap_or_default();
			let bytes = &mut dynamic[slot];
			if matches!(piece, Piece::One | Piece::First) {
				bytes.reset();
			}
			let chunk = bytes.next_piece(quantum)?;
			let (buf, alen) = (chunk.buffer_ptr(), chunk.length_ptr());
			return Ok(OutBindBufferFFI {
				buf,
				alen,
				fixed_length: 0,
				piece: Piece::Next,
				ind: self.indicator_ptr(slot),
				rcode: ptr::null_mut(),
			});
		}

		let size = self.size_in_bytes;
		let (alen, fixed_length) = match self.buffers.actual_length.as_deref_mut() {
			Some(lengths) => {
				lengths[slot] = size;
				(&raw mut lengths[slot], 0)
			}
			None => (ptr::null_mut(), self.info.size_in_bytes),
		};
		let rcode = match self.buffers.return_code.as_deref_mut() {
			Some(codes) => &raw mut codes[slot],
			None => ptr::null_mut(),
		};
		Ok(OutBindBufferFFI {
			buf: self.callback_buffer(slot),
			alen,
			fixed_length,
			piece: Piece::One,
			ind: self.indicator_ptr(slot),
			rcode,
		})
	}

	/// Next chunk of the value fetched into row `iter` of a dynamic column.
	pub fn define_callback(&mut self, iter: u32) -> Result<DefineBufferFFI> {
		if !self.is_dynamic {
			return Err(Error::NotSupported {
				operation: "piecewise fetch into a fixed buffer",
			});
		}
		let slot = self.check_slot(iter)?;
		let quantum = self.quantum();
		let dynamic = self.buffers.dynamic.as_deref_mut().unwrap_or_default();
		let chunk = dynamic[slot].next_piece(quantum)?;
		let (buf, alen) = (chunk.buffer_ptr(), chunk.length_ptr());
		Ok(DefineBufferFFI {
			buf,
			alen,
			ind: self.indicator_ptr(slot),
			rcode: ptr::null_mut(),
		})
	}

	/// Base pointers for binding or defining every slot at once.
	pub fn bind_arrays(&mut self) -> BindArraysFFI {
		let mut arrays = BindArraysFFI::empty();
		arrays.max_elements = self.capacity;
		if !self.is_dynamic {
			arrays.element_size = self.size_in_bytes;
			if let Some(handles) = self.buffers.handles.as_deref_mut() {
				arrays.value = handles.as_mut_ptr().cast();
			} else if let Some(values) = self.buffers.values.as_deref_mut() {
				arrays.value = values.as_mut_ptr().cast();
			}
		}
		if let Some(indicators) = self.buffers.indicator.as_deref_mut() {
			arrays.indicator = indicators.as_mut_ptr();
		}
		if let Some(lengths) = self.buffers.actual_length.as_deref_mut() {
			arrays.actual_length = lengths.as_mut_ptr();
		}
		if let Some(codes) = self.buffers.return_code.as_deref_mut() {
			arrays.return_code = codes.as_mut_ptr();
		}
		if let Some(indicators) = self.buffers.object_indicator.as_deref_mut() {
			arrays.object_indicators = indicators.as_mut_ptr().cast();
		}
		if self.is_array {
			arrays.current_elements = &raw mut self.element_count;
		}
		arrays
	}

	/// Pointer the native interface reads or fills for one slot: descriptors
	/// and locators are passed by value, other handles by the address of
	/// their slot in the handle array.
	fn callback_buffer(&mut self, slot: usize) -> *mut c_void {
		let r#type = self.info.r#type;
		if let Some(handles) = self.buffers.handles.as_deref_mut() {
			return if passed_by_value(r#type) {
				handles[slot].as_ptr()
			} else {
				(&raw mut handles[slot]).cast()
			};
		}
		match self.buffers.values.as_deref_mut() {
			Some(values) => {
				let offset = slot * self.size_in_bytes as usize;
				values[offset..].as_mut_ptr().cast()
			}
			None => ptr::null_mut(),
		}
	}

	fn indicator_ptr(&mut self, slot: usize) -> *mut i16 {
		match self.buffers.indicator.as_deref_mut() {
			Some(indicators) => &raw mut indicators[slot],
			None => ptr::null_mut(),
		}
	}

	/// Parks `err` for [`Variable::take_callback_error`] and returns the
	/// status that aborts the native call.
	pub(crate) fn fail(&mut self, err: Error) -> i32 {
		debug!(wire = %self.info.r#type, %err, "callback failed");
		if let Some(previous) = self.callback_error.replace(err) {
			warn!(%previous, "callback error superseded");
		}
		CALLBACK_ERROR
	}
}

/// Types whose callback buffer is the descriptor or locator itself.
fn passed_by_value(r#type: Type) -> bool {
	r#type.is_timestamp() || r#type.is_interval() || r#type.is_lob()
}
