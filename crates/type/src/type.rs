// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::{
	ffi::c_void,
	fmt::{Display, Formatter},
	mem::size_of,
};

use serde::{Deserialize, Serialize};

use crate::{
	error::{Error, Result},
	kind::NativeKind,
};

/// Database column and parameter types a variable can be bound or defined as.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
	/// Variable length character data in the database character set
	Varchar,
	/// Variable length character data in the national character set
	NVarchar,
	/// Blank padded character data
	Char,
	/// Blank padded national character data
	NChar,
	/// Row address
	Rowid,
	/// Variable length binary data
	Raw,
	/// 4-byte IEEE float
	NativeFloat,
	/// 8-byte IEEE double
	NativeDouble,
	/// 8-byte machine integer
	NativeInt,
	/// Arbitrary precision decimal in the server's 22 byte format
	Number,
	/// Calendar date with second precision
	Date,
	Timestamp,
	TimestampTz,
	TimestampLtz,
	/// Day to second interval
	IntervalDs,
	/// Year to month interval
	IntervalYm,
	Clob,
	NClob,
	Blob,
	/// Read-only file stored outside the database
	BFile,
	/// Cursor returned from a statement
	Stmt,
	Boolean,
	/// Named user defined type
	Object,
	LongVarchar,
	LongNVarchar,
	LongRaw,
}

/// How character data is encoded on the wire.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharsetForm {
	/// Not character data
	None,
	/// Database character set
	Implicit,
	/// National character set
	National,
}

/// Static description of a wire type.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeInfo {
	pub r#type: Type,
	/// Code the native interface uses to identify the buffer layout
	pub wire_code: u16,
	/// Fixed element size; zero for variable length types
	pub size_in_bytes: u32,
	pub default_native: NativeKind,
	pub charset_form: CharsetForm,
	pub is_character_data: bool,
	pub can_be_in_array: bool,
	/// Values are carried by handles that need explicit lifecycle management
	pub requires_handle: bool,
}

const POINTER_SIZE: u32 = size_of::<*mut c_void>() as u32;

const PUBLIC_CODE_BASE: u16 = 2001;

const fn info(
	r#type: Type,
	wire_code: u16,
	size_in_bytes: u32,
	default_native: NativeKind,
	charset_form: CharsetForm,
	can_be_in_array: bool,
	requires_handle: bool,
) -> TypeInfo {
	TypeInfo {
		r#type,
		wire_code,
		size_in_bytes,
		default_native,
		is_character_data: !matches!(charset_form, CharsetForm::None),
		charset_form,
		can_be_in_array,
		requires_handle,
	}
}

static CATALOG: [TypeInfo; 26] = [
	info(Type::Varchar, 1, 0, NativeKind::Bytes, CharsetForm::Implicit, true, false),
	info(Type::NVarchar, 1, 0, NativeKind::Bytes, CharsetForm::National, true, false),
	info(Type::Char, 96, 0, NativeKind::Bytes, CharsetForm::Implicit, true, false),
	info(Type::NChar, 96, 0, NativeKind::Bytes, CharsetForm::National, true, false),
	info(Type::Rowid, 104, POINTER_SIZE, NativeKind::Rowid, CharsetForm::None, true, true),
	info(Type::Raw, 23, 0, NativeKind::Bytes, CharsetForm::None, true, false),
	info(Type::NativeFloat, 21, 4, NativeKind::Float, CharsetForm::None, true, false),
	info(Type::NativeDouble, 22, 8, NativeKind::Double, CharsetForm::None, true, false),
	info(Type::NativeInt, 3, 8, NativeKind::Int64, CharsetForm::None, true, false),
	info(Type::Number, 6, 22, NativeKind::Double, CharsetForm::None, true, false),
	info(Type::Date, 156, 7, NativeKind::Timestamp, CharsetForm::None, true, false),
	info(Type::Timestamp, 187, POINTER_SIZE, NativeKind::Timestamp, CharsetForm::None, true, false),
	info(Type::TimestampTz, 188, POINTER_SIZE, NativeKind::Timestamp, CharsetForm::None, true, false),
	info(Type::TimestampLtz, 232, POINTER_SIZE, NativeKind::Timestamp, CharsetForm::None, true, false),
	info(Type::IntervalDs, 190, POINTER_SIZE, NativeKind::IntervalDs, CharsetForm::None, true, false),
	info(Type::IntervalYm, 189, POINTER_SIZE, NativeKind::IntervalYm, CharsetForm::None, true, false),
	info(Type::Clob, 112, POINTER_SIZE, NativeKind::Lob, CharsetForm::Implicit, false, true),
	info(Type::NClob, 112, POINTER_SIZE, NativeKind::Lob, CharsetForm::National, false, true),
	info(Type::Blob, 113, POINTER_SIZE, NativeKind::Lob, CharsetForm::None, false, true),
	info(Type::BFile, 114, POINTER_SIZE, NativeKind::Lob, CharsetForm::None, false, true),
	info(Type::Stmt, 116, POINTER_SIZE, NativeKind::Stmt, CharsetForm::None, false, true),
	info(Type::Boolean, 252, 4, NativeKind::Boolean, CharsetForm::None, false, false),
	info(Type::Object, 108, POINTER_SIZE, NativeKind::Object, CharsetForm::None, false, true),
	info(Type::LongVarchar, 94, 0, NativeKind::Bytes, CharsetForm::Implicit, false, false),
	info(Type::LongNVarchar, 94, 0, NativeKind::Bytes, CharsetForm::National, false, false),
	info(Type::LongRaw, 95, 0, NativeKind::Bytes, CharsetForm::None, false, false),
];

impl Type {
	pub const ALL: [Type; 26] = [
		Type::Varchar,
		Type::NVarchar,
		Type::Char,
		Type::NChar,
		Type::Rowid,
		Type::Raw,
		Type::NativeFloat,
		Type::NativeDouble,
		Type::NativeInt,
		Type::Number,
		Type::Date,
		Type::Timestamp,
		Type::TimestampTz,
		Type::TimestampLtz,
		Type::IntervalDs,
		Type::IntervalYm,
		Type::Clob,
		Type::NClob,
		Type::Blob,
		Type::BFile,
		Type::Stmt,
		Type::Boolean,
		Type::Object,
		Type::LongVarchar,
		Type::LongNVarchar,
		Type::LongRaw,
	];

	pub fn info(self) -> &'static TypeInfo {
		&CATALOG[self as usize]
	}

	/// Public numeric code, stable across releases.
	pub fn to_u16(self) -> u16 {
		PUBLIC_CODE_BASE + self as u16
	}

	pub fn from_u16(code: u16) -> Result<Self> {
		code.checked_sub(PUBLIC_CODE_BASE)
			.and_then(|index| Self::ALL.get(index as usize).copied())
			.ok_or(Error::UnknownType(code))
	}

	pub fn is_lob(self) -> bool {
		matches!(self, Type::Clob | Type::NClob | Type::Blob | Type::BFile)
	}

	pub fn is_timestamp(self) -> bool {
		matches!(self, Type::Timestamp | Type::TimestampTz | Type::TimestampLtz)
	}

	/// Timestamps whose value carries a time zone offset.
	pub fn has_time_zone(self) -> bool {
		matches!(self, Type::TimestampTz | Type::TimestampLtz)
	}

	pub fn is_interval(self) -> bool {
		matches!(self, Type::IntervalDs | Type::IntervalYm)
	}

	pub fn is_long(self) -> bool {
		matches!(self, Type::LongVarchar | Type::LongNVarchar | Type::LongRaw)
	}

	/// Large object type a byte variable of this type is converted into when
	/// its content outgrows what the native interface accepts inline.
	pub fn lob_counterpart(self) -> Type {
		match self {
			Type::NVarchar | Type::NChar | Type::LongNVarchar => Type::NClob,
			Type::Raw | Type::LongRaw => Type::Blob,
			_ => Type::Clob,
		}
	}
}

impl TypeInfo {
	pub fn lookup(code: u16) -> Result<&'static TypeInfo> {
		Type::from_u16(code).map(Type::info)
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Type::Varchar => f.write_str("VARCHAR"),
			Type::NVarchar => f.write_str("NVARCHAR"),
			Type::Char => f.write_str("CHAR"),
			Type::NChar => f.write_str("NCHAR"),
			Type::Rowid => f.write_str("ROWID"),
			Type::Raw => f.write_str("RAW"),
			Type::NativeFloat => f.write_str("BINARY_FLOAT"),
			Type::NativeDouble => f.write_str("BINARY_DOUBLE"),
			Type::NativeInt => f.write_str("BINARY_INTEGER"),
			Type::Number => f.write_str("NUMBER"),
			Type::Date => f.write_str("DATE"),
			Type::Timestamp => f.write_str("TIMESTAMP"),
			Type::TimestampTz => f.write_str("TIMESTAMP WITH TIME ZONE"),
			Type::TimestampLtz => f.write_str("TIMESTAMP WITH LOCAL TIME ZONE"),
			Type::IntervalDs => f.write_str("INTERVAL DAY TO SECOND"),
			Type::IntervalYm => f.write_str("INTERVAL YEAR TO MONTH"),
			Type::Clob => f.write_str("CLOB"),
			Type::NClob => f.write_str("NCLOB"),
			Type::Blob => f.write_str("BLOB"),
			Type::BFile => f.write_str("BFILE"),
			Type::Stmt => f.write_str("REF CURSOR"),
			Type::Boolean => f.write_str("BOOLEAN"),
			Type::Object => f.write_str("OBJECT"),
			Type::LongVarchar => f.write_str("LONG"),
			Type::LongNVarchar => f.write_str("LONG NVARCHAR"),
			Type::LongRaw => f.write_str("LONG RAW"),
		}
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_catalog_is_indexed_by_type() {
		for r#type in Type::ALL {
			assert_eq!(r#type.info().r#type, r#type);
		}
	}

	#[test]
	fn test_public_code_round_trip() {
		assert_eq!(Type::Varchar.to_u16(), 2001);
		assert_eq!(Type::LongRaw.to_u16(), 2026);
		for r#type in Type::ALL {
			assert_eq!(Type::from_u16(r#type.to_u16()).unwrap(), r#type);
		}
	}

	#[test]
	fn test_unknown_code() {
		assert!(matches!(Type::from_u16(2000), Err(Error::UnknownType(2000))));
		assert!(matches!(Type::from_u16(2027), Err(Error::UnknownType(2027))));
		assert!(matches!(TypeInfo::lookup(0), Err(Error::UnknownType(0))));
	}

	#[test]
	fn test_variable_length_types_have_no_fixed_size() {
		for r#type in [Type::Varchar, Type::NChar, Type::Raw, Type::LongVarchar, Type::LongRaw] {
			assert_eq!(r#type.info().size_in_bytes, 0);
			assert_eq!(r#type.info().default_native, NativeKind::Bytes);
		}
	}

	#[test]
	fn test_handle_types() {
		let handles: Vec<_> = Type::ALL.iter().filter(|t| t.info().requires_handle).copied().collect();
		assert_eq!(
			handles,
			vec![
				Type::Rowid,
				Type::Clob,
				Type::NClob,
				Type::Blob,
				Type::BFile,
				Type::Stmt,
				Type::Object
			]
		);
	}

	#[test]
	fn test_character_data_follows_charset() {
		assert!(Type::NVarchar.info().is_character_data);
		assert_eq!(Type::NClob.info().charset_form, CharsetForm::National);
		assert!(!Type::Raw.info().is_character_data);
		assert!(!Type::Blob.info().is_character_data);
	}

	#[test]
	fn test_lob_counterpart() {
		assert_eq!(Type::Varchar.lob_counterpart(), Type::Clob);
		assert_eq!(Type::NVarchar.lob_counterpart(), Type::NClob);
		assert_eq!(Type::LongRaw.lob_counterpart(), Type::Blob);
	}
}
