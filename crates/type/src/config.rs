// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use serde::{Deserialize, Serialize};

use crate::{
	constants::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_BASIC_BUFFER_SIZE, DEFAULT_MAX_BYTES_PER_CHARACTER},
	r#type::CharsetForm,
};

/// Settings of the connection environment that drive buffer sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
	/// Worst case bytes per character in the database character set.
	pub max_bytes_per_character: u32,
	/// Worst case bytes per character in the national character set.
	pub nmax_bytes_per_character: u32,
	pub encoding: String,
	pub nencoding: String,
	/// Text is exchanged as UTF-16, doubling per character scratch space.
	pub utf16: bool,
	/// Allocation quantum for dynamic byte chunks.
	pub chunk_size: u32,
	/// Byte variables larger than this are exchanged piecewise.
	pub max_basic_buffer_size: u32,
}

impl Default for EnvConfig {
	fn default() -> Self {
		Self {
			max_bytes_per_character: DEFAULT_MAX_BYTES_PER_CHARACTER,
			nmax_bytes_per_character: DEFAULT_MAX_BYTES_PER_CHARACTER,
			encoding: "UTF-8".to_string(),
			nencoding: "UTF-8".to_string(),
			utf16: false,
			chunk_size: DEFAULT_CHUNK_SIZE,
			max_basic_buffer_size: DEFAULT_MAX_BASIC_BUFFER_SIZE,
		}
	}
}

impl EnvConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn max_bytes_per_character(mut self, bytes: u32) -> Self {
		self.max_bytes_per_character = bytes;
		self
	}

	pub fn nmax_bytes_per_character(mut self, bytes: u32) -> Self {
		self.nmax_bytes_per_character = bytes;
		self
	}

	pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
		self.encoding = encoding.into();
		self
	}

	pub fn nencoding(mut self, encoding: impl Into<String>) -> Self {
		self.nencoding = encoding.into();
		self
	}

	pub fn utf16(mut self, utf16: bool) -> Self {
		self.utf16 = utf16;
		self
	}

	pub fn chunk_size(mut self, size: u32) -> Self {
		self.chunk_size = size;
		self
	}

	pub fn max_basic_buffer_size(mut self, size: u32) -> Self {
		self.max_basic_buffer_size = size;
		self
	}

	/// Bytes a single character may take in the given character set.
	pub fn bytes_per_character(&self, form: CharsetForm) -> u32 {
		match form {
			CharsetForm::National => self.nmax_bytes_per_character,
			CharsetForm::Implicit => self.max_bytes_per_character,
			CharsetForm::None => 1,
		}
	}

	/// Encoding name published on byte cells of the given character set.
	/// Everything outside the national character set reports `encoding`.
	pub fn encoding_for(&self, form: CharsetForm) -> &str {
		match form {
			CharsetForm::National => &self.nencoding,
			CharsetForm::Implicit | CharsetForm::None => &self.encoding,
		}
	}
}
