// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use bindbuf_type::{Error, NativeKind, Result, Type, TypeInfo};

/// Coercion between a variable's wire type and its native kind, fixed when
/// the variable is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conversion {
	Int64,
	Uint64,
	Float,
	Double,
	Boolean,
	NumberAsInt64,
	NumberAsUint64,
	NumberAsDouble,
	NumberAsText,
	Bytes,
	/// Byte variable whose storage is a large object per slot
	LobAsBytes,
	Date,
	Timestamp {
		with_tz: bool,
	},
	TimestampAsDouble,
	IntervalDs,
	IntervalYm,
	Lob,
	Stmt,
	Rowid,
	Object,
}

/// Rejects native kinds other than the type's default unless the pair is one
/// of the few accepted alternatives.
pub(crate) fn validate_types(info: &TypeInfo, native: NativeKind) -> Result<()> {
	if native == info.default_native {
		return Ok(());
	}
	let accepted = match info.r#type {
		Type::Timestamp | Type::TimestampTz | Type::TimestampLtz => native == NativeKind::Double,
		Type::NativeInt => native == NativeKind::Uint64,
		Type::Number => matches!(native, NativeKind::Int64 | NativeKind::Uint64 | NativeKind::Bytes),
		_ => false,
	};
	if accepted {
		Ok(())
	} else {
		Err(Error::UnhandledConversion {
			wire: info.r#type,
			native,
		})
	}
}

impl Conversion {
	pub(crate) fn resolve(info: &TypeInfo, native: NativeKind) -> Result<Self> {
		validate_types(info, native)?;
		let conversion = match (info.r#type, native) {
			(Type::NativeInt, NativeKind::Int64) => Conversion::Int64,
			(Type::NativeInt, NativeKind::Uint64) => Conversion::Uint64,
			(Type::NativeFloat, NativeKind::Float) => Conversion::Float,
			(Type::NativeDouble, NativeKind::Double) => Conversion::Double,
			(Type::Boolean, NativeKind::Boolean) => Conversion::Boolean,
			(Type::Number, NativeKind::Int64) => Conversion::NumberAsInt64,
			(Type::Number, NativeKind::Uint64) => Conversion::NumberAsUint64,
			(Type::Number, NativeKind::Double) => Conversion::NumberAsDouble,
			(Type::Number, NativeKind::Bytes) => Conversion::NumberAsText,
			(Type::Date, NativeKind::Timestamp) => Conversion::Date,
			(wire, NativeKind::Timestamp) if wire.is_timestamp() => Conversion::Timestamp {
				with_tz: wire.has_time_zone(),
			},
			(wire, NativeKind::Double) if wire.is_timestamp() => Conversion::TimestampAsDouble,
			(Type::IntervalDs, NativeKind::IntervalDs) => Conversion::IntervalDs,
			(Type::IntervalYm, NativeKind::IntervalYm) => Conversion::IntervalYm,
			(wire, NativeKind::Lob) if wire.is_lob() => Conversion::Lob,
			(Type::Stmt, NativeKind::Stmt) => Conversion::Stmt,
			(Type::Rowid, NativeKind::Rowid) => Conversion::Rowid,
			(Type::Object, NativeKind::Object) => Conversion::Object,
			(_, NativeKind::Bytes) => Conversion::Bytes,
			(wire, native) => {
				return Err(Error::UnhandledConversion {
					wire,
					native,
				});
			}
		};
		Ok(conversion)
	}

	/// Name of the handle kind values must carry, for handle conversions.
	pub(crate) fn handle_name(self) -> Option<&'static str> {
		match self {
			Conversion::Lob => Some("LOB"),
			Conversion::Stmt => Some("statement"),
			Conversion::Rowid => Some("rowid"),
			Conversion::Object => Some("object"),
			_ => None,
		}
	}
}
