// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Representation a caller exchanges values in, independent of how the value
/// travels on the wire.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeKind {
	Int64,
	Uint64,
	Float,
	Double,
	Bytes,
	Timestamp,
	IntervalDs,
	IntervalYm,
	Lob,
	Object,
	Stmt,
	Boolean,
	Rowid,
}

impl NativeKind {
	/// Values of this kind are shared handles rather than plain data.
	pub fn is_handle(self) -> bool {
		matches!(self, NativeKind::Lob | NativeKind::Object | NativeKind::Stmt | NativeKind::Rowid)
	}

	pub fn name(self) -> &'static str {
		match self {
			NativeKind::Int64 => "int64",
			NativeKind::Uint64 => "uint64",
			NativeKind::Float => "float",
			NativeKind::Double => "double",
			NativeKind::Bytes => "bytes",
			NativeKind::Timestamp => "timestamp",
			NativeKind::IntervalDs => "interval day to second",
			NativeKind::IntervalYm => "interval year to month",
			NativeKind::Lob => "lob",
			NativeKind::Object => "object",
			NativeKind::Stmt => "statement",
			NativeKind::Boolean => "boolean",
			NativeKind::Rowid => "rowid",
		}
	}
}

impl Display for NativeKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}
