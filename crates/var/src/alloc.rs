// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use bindbuf_type::{Error, Result};

/// Vector of `len` copies of `value`, reporting allocation failure instead of
/// aborting.
pub(crate) fn filled<T: Clone>(len: usize, value: T, action: &'static str) -> Result<Vec<T>> {
	let mut buffer = Vec::new();
	buffer.try_reserve_exact(len).map_err(|_| Error::NoMemory {
		action,
	})?;
	buffer.resize(len, value);
	Ok(buffer)
}

pub(crate) fn filled_with<T>(len: usize, f: impl FnMut() -> T, action: &'static str) -> Result<Vec<T>> {
	let mut buffer = Vec::new();
	buffer.try_reserve_exact(len).map_err(|_| Error::NoMemory {
		action,
	})?;
	buffer.resize_with(len, f);
	Ok(buffer)
}

pub(crate) fn zeroed(len: usize, action: &'static str) -> Result<Vec<u8>> {
	filled(len, 0u8, action)
}
