// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::fmt::{Display, Formatter};

use crate::{kind::NativeKind, r#type::Type};

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by the native call interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
	pub code: i32,
	pub message: String,
}

impl NativeError {
	pub fn new(code: i32, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}
}

impl Display for NativeError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}] {}", self.code, self.message)
	}
}

impl std::error::Error for NativeError {}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("unknown type code {0}")]
	UnknownType(u16),

	#[error("array size cannot be zero")]
	ArraySizeZero,

	#[error("array size of {capacity} is too small to access position {position}")]
	ArraySizeExceeded {
		capacity: u32,
		position: u32,
	},

	#[error("array size of {capacity} is too large for elements of {size_in_bytes} bytes")]
	ArraySizeTooBig {
		capacity: u32,
		size_in_bytes: u32,
	},

	#[error("{operation} is not supported by this variable")]
	NotSupported {
		operation: &'static str,
	},

	#[error("out of memory while trying to {action}")]
	NoMemory {
		action: &'static str,
	},

	#[error("object type is required for object variables")]
	NoObjectType,

	#[error("conversion between {wire} and {native} is not implemented")]
	UnhandledConversion {
		wire: Type,
		native: NativeKind,
	},

	#[error("invalid {expected} handle")]
	InvalidHandle {
		expected: &'static str,
	},

	#[error("value of {length} bytes exceeds the buffer size of {limit} bytes")]
	BufferSizeTooSmall {
		length: usize,
		limit: u32,
	},

	#[error("error fetching column at array position {position}: code {code}")]
	ColumnFetch {
		position: u32,
		code: u16,
	},

	#[error("failed to {action}: {source}")]
	Native {
		action: &'static str,
		source: NativeError,
	},

	#[error("internal error: {reason}")]
	Internal {
		reason: &'static str,
	},
}

impl Error {
	pub fn native(action: &'static str, source: NativeError) -> Self {
		Error::Native {
			action,
			source,
		}
	}

	/// Stable identifier for the failure, suitable for matching by callers
	/// that cannot depend on the enum.
	pub fn code(&self) -> &'static str {
		match self {
			Error::UnknownType(_) => "VAR_001",
			Error::ArraySizeZero => "VAR_002",
			Error::ArraySizeExceeded {
				..
			} => "VAR_003",
			Error::ArraySizeTooBig {
				..
			} => "VAR_004",
			Error::NotSupported {
				..
			} => "VAR_005",
			Error::NoMemory {
				..
			} => "VAR_006",
			Error::NoObjectType => "VAR_007",
			Error::UnhandledConversion {
				..
			} => "VAR_008",
			Error::InvalidHandle {
				..
			} => "VAR_009",
			Error::BufferSizeTooSmall {
				..
			} => "VAR_010",
			Error::ColumnFetch {
				..
			} => "VAR_011",
			Error::Native {
				..
			} => "VAR_012",
			Error::Internal {
				..
			} => "VAR_013",
		}
	}
}
