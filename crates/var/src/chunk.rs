// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Growable byte storage for values without a useful upper bound.
//!
//! Each slot of a dynamic variable owns a [`DynamicBytes`]. Values written by
//! the caller always occupy a single chunk. Values fetched piecewise arrive
//! across several chunks, one per define callback, and are merged into one
//! chunk before they are handed out.

use std::ffi::c_void;

use bindbuf_type::{Error, Result, constants::CHUNK_GROWTH};
use tracing::trace;

use crate::alloc::zeroed;

#[derive(Debug, Default)]
pub struct Chunk {
	buffer: Vec<u8>,
	length: u32,
}

impl Chunk {
	/// Bytes currently valid.
	pub fn length(&self) -> u32 {
		self.length
	}

	/// Bytes reserved. Reserves never exceed `u32::MAX`.
	pub fn allocated_length(&self) -> u32 {
		u32::try_from(self.buffer.len()).unwrap_or(u32::MAX)
	}

	pub fn as_slice(&self) -> &[u8] {
		let valid = (self.length as usize).min(self.buffer.len());
		&self.buffer[..valid]
	}

	pub(crate) fn buffer_mut(&mut self) -> &mut [u8] {
		&mut self.buffer
	}

	pub(crate) fn set_length(&mut self, length: u32) {
		self.length = length.min(self.allocated_length());
	}

	pub(crate) fn buffer_ptr(&mut self) -> *mut c_void {
		self.buffer.as_mut_ptr().cast()
	}

	pub(crate) fn length_ptr(&mut self) -> *mut u32 {
		&mut self.length
	}
}

/// Chunks of one slot; `num_chunks` of the reserved entries hold data.
#[derive(Debug, Default)]
pub struct DynamicBytes {
	chunks: Vec<Chunk>,
	num_chunks: usize,
}

/// `size` rounded up to a multiple of `quantum`, capped at `u32::MAX`.
fn round_up(size: u32, quantum: u32) -> u32 {
	let quantum = u64::from(quantum.max(1));
	let rounded = u64::from(size).div_ceil(quantum) * quantum;
	u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Combined reserve of the pieces being merged; it must stay addressable
/// by a single chunk length.
fn merged_size(sizes: impl Iterator<Item = usize>) -> Result<usize> {
	let total = sizes.fold(0usize, usize::saturating_add);
	if u32::try_from(total).is_err() {
		return Err(Error::BufferSizeTooSmall {
			length: total,
			limit: u32::MAX,
		});
	}
	Ok(total)
}

impl DynamicBytes {
	pub fn num_chunks(&self) -> usize {
		self.num_chunks
	}

	pub fn allocated_chunks(&self) -> usize {
		self.chunks.len()
	}

	/// Chunks holding data, in order.
	pub fn chunks(&self) -> &[Chunk] {
		&self.chunks[..self.num_chunks]
	}

	/// The slot's value once it occupies at most one chunk.
	pub fn as_slice(&self) -> &[u8] {
		match self.chunks() {
			[] => &[],
			[first, ..] => first.as_slice(),
		}
	}

	pub(crate) fn first_mut(&mut self) -> Option<&mut Chunk> {
		if self.num_chunks == 0 {
			return None;
		}
		self.chunks.first_mut()
	}

	/// Forgets the slot's content; reserved chunks are kept for reuse.
	pub(crate) fn reset(&mut self) {
		self.num_chunks = 0;
	}

	/// Reserves another group of chunk entries once all are in use.
	pub(crate) fn ensure_chunks(&mut self) -> Result<()> {
		if self.num_chunks < self.chunks.len() {
			return Ok(());
		}
		self.chunks.try_reserve_exact(CHUNK_GROWTH).map_err(|_| Error::NoMemory {
			action: "allocate chunks",
		})?;
		self.chunks.resize_with(self.chunks.len() + CHUNK_GROWTH, Chunk::default);
		trace!(allocated = self.chunks.len(), "grew chunk array");
		Ok(())
	}

	/// Leaves exactly one empty chunk able to hold `size` bytes, its reserve
	/// rounded up to a multiple of `quantum`.
	pub(crate) fn allocate(&mut self, size: u32, quantum: u32) -> Result<&mut Chunk> {
		self.num_chunks = 0;
		self.ensure_chunks()?;
		let first = &mut self.chunks[0];
		if size > first.allocated_length() {
			first.buffer = Vec::new();
			first.buffer = zeroed(round_up(size, quantum) as usize, "allocate chunk")?;
		}
		first.length = 0;
		self.num_chunks = 1;
		Ok(first)
	}

	/// Replaces the slot's content with a copy of `value` in a single chunk.
	pub(crate) fn write(&mut self, value: &[u8], quantum: u32) -> Result<()> {
		let length = u32::try_from(value.len()).map_err(|_| Error::BufferSizeTooSmall {
			length: value.len(),
			limit: u32::MAX,
		})?;
		let first = self.allocate(length, quantum)?;
		first.buffer[..value.len()].copy_from_slice(value);
		first.length = length;
		Ok(())
	}

	/// Hands out the next chunk for a piecewise transfer, reserving entries
	/// and memory as needed. The chunk is marked fully used; the native
	/// interface overwrites the length with what it actually wrote.
	pub(crate) fn next_piece(&mut self, quantum: u32) -> Result<&mut Chunk> {
		self.ensure_chunks()?;
		let index = self.num_chunks;
		let chunk = &mut self.chunks[index];
		if chunk.buffer.is_empty() {
			chunk.buffer = zeroed(quantum.max(1) as usize, "allocate chunk")?;
		}
		chunk.length = chunk.allocated_length();
		self.num_chunks = index + 1;
		Ok(&mut self.chunks[index])
	}

	/// Merges all chunks into the first one. A slot with at most one chunk
	/// is left untouched.
	pub(crate) fn consolidate(&mut self) -> Result<()> {
		if self.num_chunks <= 1 {
			return Ok(());
		}
		let pieces = &mut self.chunks[..self.num_chunks];
		let total = merged_size(pieces.iter().map(|chunk| chunk.buffer.len()))?;
		let mut buffer = zeroed(total, "allocate chunk")?;
		let mut length = 0;
		for chunk in pieces.iter_mut() {
			let valid = chunk.as_slice().len();
			buffer[length..length + valid].copy_from_slice(&chunk.buffer[..valid]);
			length += valid;
			chunk.buffer = Vec::new();
			chunk.length = 0;
		}
		trace!(pieces = self.num_chunks, length, "consolidated chunks");
		let length = u32::try_from(length).unwrap_or(u32::MAX);
		self.chunks[0] = Chunk {
			buffer,
			length,
		};
		self.num_chunks = 1;
		Ok(())
	}
}
