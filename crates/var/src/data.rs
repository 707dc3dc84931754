// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::rc::{Rc, Weak};

use bindbuf_native::{Lob, Object, Rowid, Stmt};
use bindbuf_type::{CharsetForm, IntervalDs, IntervalYm, NativeKind, Timestamp};

/// Where the bytes of a byte cell live inside the variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
	/// No value produced yet
	Unset,
	/// Fixed value array at the given byte offset
	Fixed {
		offset: usize,
	},
	/// Scratch area used for numbers exchanged as text
	Scratch {
		offset: usize,
	},
	/// The slot's single dynamic chunk
	Chunk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesRef {
	pub region: Region,
	pub length: u32,
	pub charset: CharsetForm,
	/// Encoding of the environment character set the bytes are in.
	pub encoding: Rc<str>,
}

/// Decoded content of one slot as last read or written.
///
/// Complex handles are published as weak references; the slot's strong
/// reference lives in the [`ReferenceTracker`](crate::ReferenceTracker).
#[derive(Debug, Clone)]
pub enum DataValue {
	Empty,
	Int64(i64),
	Uint64(u64),
	Float(f32),
	Double(f64),
	Boolean(bool),
	Bytes(BytesRef),
	Timestamp(Timestamp),
	IntervalDs(IntervalDs),
	IntervalYm(IntervalYm),
	Lob(Weak<Lob>),
	Object(Weak<Object>),
	Stmt(Weak<Stmt>),
	Rowid(Weak<Rowid>),
}

/// Externally visible cell of one slot.
#[derive(Debug, Clone)]
pub struct Data {
	pub is_null: bool,
	pub value: DataValue,
}

impl Data {
	pub(crate) fn null() -> Self {
		Self {
			is_null: true,
			value: DataValue::Empty,
		}
	}
}

/// Borrowed view of a slot's value.
///
/// Callers write byte values as [`Value::Bytes`]; slots read them back as
/// [`Value::Encoded`], tagged with the encoding of their character set.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
	Null,
	Int64(i64),
	Uint64(u64),
	Float(f32),
	Double(f64),
	Boolean(bool),
	Bytes(&'a [u8]),
	Encoded {
		bytes: &'a [u8],
		encoding: &'a str,
	},
	Timestamp(Timestamp),
	IntervalDs(IntervalDs),
	IntervalYm(IntervalYm),
	Lob(&'a Rc<Lob>),
	Object(&'a Rc<Object>),
	Stmt(&'a Rc<Stmt>),
	Rowid(&'a Rc<Rowid>),
}

impl<'a> Value<'a> {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Native kind the value is expressed in; `None` for null.
	pub fn kind(&self) -> Option<NativeKind> {
		Some(match self {
			Value::Null => return None,
			Value::Int64(_) => NativeKind::Int64,
			Value::Uint64(_) => NativeKind::Uint64,
			Value::Float(_) => NativeKind::Float,
			Value::Double(_) => NativeKind::Double,
			Value::Boolean(_) => NativeKind::Boolean,
			Value::Bytes(_) | Value::Encoded {
				..
			} => NativeKind::Bytes,
			Value::Timestamp(_) => NativeKind::Timestamp,
			Value::IntervalDs(_) => NativeKind::IntervalDs,
			Value::IntervalYm(_) => NativeKind::IntervalYm,
			Value::Lob(_) => NativeKind::Lob,
			Value::Object(_) => NativeKind::Object,
			Value::Stmt(_) => NativeKind::Stmt,
			Value::Rowid(_) => NativeKind::Rowid,
		})
	}

	pub fn as_bytes(&self) -> Option<&'a [u8]> {
		match self {
			Value::Bytes(bytes)
			| Value::Encoded {
				bytes,
				..
			} => Some(bytes),
			_ => None,
		}
	}

	/// Encoding of a byte value read from a slot.
	pub fn encoding(&self) -> Option<&'a str> {
		match self {
			Value::Encoded {
				encoding,
				..
			} => Some(encoding),
			_ => None,
		}
	}

	pub fn as_int64(&self) -> Option<i64> {
		match self {
			Value::Int64(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_double(&self) -> Option<f64> {
		match self {
			Value::Double(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_lob(&self) -> Option<&'a Rc<Lob>> {
		match self {
			Value::Lob(lob) => Some(lob),
			_ => None,
		}
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_kind() {
		assert_eq!(Value::Null.kind(), None);
		assert_eq!(Value::Bytes(b"x").kind(), Some(NativeKind::Bytes));
		assert_eq!(
			Value::Encoded {
				bytes: b"x",
				encoding: "UTF-8"
			}
			.kind(),
			Some(NativeKind::Bytes)
		);
		assert_eq!(Value::Uint64(1).kind(), Some(NativeKind::Uint64));
		assert_eq!(Value::Timestamp(Timestamp::default()).kind(), Some(NativeKind::Timestamp));
	}

	#[test]
	fn test_accessors() {
		assert_eq!(Value::Bytes(b"abc").as_bytes(), Some(&b"abc"[..]));
		assert_eq!(Value::Int64(-3).as_int64(), Some(-3));
		assert_eq!(Value::Double(1.5).as_double(), Some(1.5));
		assert_eq!(Value::Int64(1).as_bytes(), None);
		let encoded = Value::Encoded {
			bytes: b"abc",
			encoding: "AL16UTF16",
		};
		assert_eq!(encoded.as_bytes(), Some(&b"abc"[..]));
		assert_eq!(encoded.encoding(), Some("AL16UTF16"));
		assert_eq!(Value::Bytes(b"abc").encoding(), None);
		assert!(Value::Null.is_null());
	}
}
