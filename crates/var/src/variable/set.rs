// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::rc::Rc;

use bindbuf_abi::{INDICATOR_NOT_NULL, INDICATOR_NULL};
use bindbuf_native::{Lob, Object, Rowid, Stmt};
use bindbuf_type::{Error, NativeKind, Result};

use super::Variable;
use crate::{
	conversion::Conversion,
	data::{BytesRef, DataValue, Region, Value},
	reference::{Candidate, Reference},
};

impl Variable {
	/// Writes `value` into the slot's native buffers. The value must be
	/// expressed in the variable's native kind; null is always accepted.
	///
	/// Object slots read as null through the instance's own indicator. A null
	/// written over an attached instance leaves that instance in place, so the
	/// slot keeps reading as the instance does; an empty slot gets a fresh
	/// instance marked null.
	pub fn set_value(&mut self, slot: u32, value: Value<'_>) -> Result<()> {
		let slot = self.check_slot(slot)?;
		self.store(slot, value)
	}

	pub fn set_from_bytes(&mut self, slot: u32, value: &[u8]) -> Result<()> {
		let slot = self.check_slot(slot)?;
		self.check_native(NativeKind::Bytes, "setting from bytes")?;
		self.store(slot, Value::Bytes(value))
	}

	pub fn set_from_lob(&mut self, slot: u32, lob: &Rc<Lob>) -> Result<()> {
		let slot = self.check_slot(slot)?;
		self.check_native(NativeKind::Lob, "setting from a LOB")?;
		self.store(slot, Value::Lob(lob))
	}

	pub fn set_from_object(&mut self, slot: u32, object: &Rc<Object>) -> Result<()> {
		let slot = self.check_slot(slot)?;
		self.check_native(NativeKind::Object, "setting from an object")?;
		self.store(slot, Value::Object(object))
	}

	pub fn set_from_rowid(&mut self, slot: u32, rowid: &Rc<Rowid>) -> Result<()> {
		let slot = self.check_slot(slot)?;
		self.check_native(NativeKind::Rowid, "setting from a rowid")?;
		self.store(slot, Value::Rowid(rowid))
	}

	pub fn set_from_stmt(&mut self, slot: u32, stmt: &Rc<Stmt>) -> Result<()> {
		let slot = self.check_slot(slot)?;
		self.check_native(NativeKind::Stmt, "setting from a statement")?;
		self.store(slot, Value::Stmt(stmt))
	}

	/// Copies the source slot's cell into the target slot. Both variables
	/// must use the same native kind.
	pub fn copy_data(&mut self, slot: u32, source: &Variable, source_slot: u32) -> Result<()> {
		let slot = self.check_slot(slot)?;
		let value = source.value(source_slot)?;
		if self.native != source.native {
			return Err(Error::NotSupported {
				operation: "copying between variables of different native kinds",
			});
		}
		self.store(slot, value)
	}

	fn store(&mut self, slot: usize, value: Value<'_>) -> Result<()> {
		let env = Rc::clone(&self.env);
		let native = env.native();
		let stored = match (self.conversion, value) {
			(_, Value::Null) => return self.store_null(slot),
			(Conversion::Int64, Value::Int64(v)) => {
				self.element_mut(slot).copy_from_slice(&v.to_ne_bytes());
				DataValue::Int64(v)
			}
			(Conversion::Uint64, Value::Uint64(v)) => {
				self.element_mut(slot).copy_from_slice(&v.to_ne_bytes());
				DataValue::Uint64(v)
			}
			(Conversion::Float, Value::Float(v)) => {
				self.element_mut(slot).copy_from_slice(&v.to_ne_bytes());
				DataValue::Float(v)
			}
			(Conversion::Double, Value::Double(v)) => {
				self.element_mut(slot).copy_from_slice(&v.to_ne_bytes());
				DataValue::Double(v)
			}
			(Conversion::Boolean, Value::Boolean(v)) => {
				self.element_mut(slot).copy_from_slice(&i32::from(v).to_ne_bytes());
				DataValue::Boolean(v)
			}
			(Conversion::NumberAsInt64, Value::Int64(v)) => {
				let number = native.number_from_i64(v).map_err(|err| Error::native("convert integer to number", err))?;
				self.element_mut(slot).copy_from_slice(&number.0);
				DataValue::Int64(v)
			}
			(Conversion::NumberAsUint64, Value::Uint64(v)) => {
				let number =
					native.number_from_u64(v).map_err(|err| Error::native("convert unsigned integer to number", err))?;
				self.element_mut(slot).copy_from_slice(&number.0);
				DataValue::Uint64(v)
			}
			(Conversion::NumberAsDouble, Value::Double(v)) => {
				let number = native.number_from_f64(v).map_err(|err| Error::native("convert double to number", err))?;
				self.element_mut(slot).copy_from_slice(&number.0);
				DataValue::Double(v)
			}
			(
				Conversion::NumberAsText | Conversion::Bytes | Conversion::LobAsBytes,
				Value::Bytes(bytes)
				| Value::Encoded {
					bytes,
					..
				},
			) => self.write_bytes(slot, bytes)?,
			(Conversion::Date, Value::Timestamp(v)) => {
				let date = native.date_from_timestamp(&v);
				self.element_mut(slot).copy_from_slice(&date.0);
				DataValue::Timestamp(v)
			}
			(
				Conversion::Timestamp {
					with_tz,
				},
				Value::Timestamp(v),
			) => {
				native
					.timestamp_set(self.handle(slot), &v, with_tz)
					.map_err(|err| Error::native("set timestamp", err))?;
				DataValue::Timestamp(v)
			}
			(Conversion::TimestampAsDouble, Value::Double(v)) => {
				native
					.timestamp_from_f64(self.handle(slot), v)
					.map_err(|err| Error::native("convert double to timestamp", err))?;
				DataValue::Double(v)
			}
			(Conversion::IntervalDs, Value::IntervalDs(v)) => {
				native.interval_ds_set(self.handle(slot), &v).map_err(|err| Error::native("set interval", err))?;
				DataValue::IntervalDs(v)
			}
			(Conversion::IntervalYm, Value::IntervalYm(v)) => {
				native.interval_ym_set(self.handle(slot), &v).map_err(|err| Error::native("set interval", err))?;
				DataValue::IntervalYm(v)
			}
			(Conversion::Lob, Value::Lob(lob)) => {
				lob.check()?;
				self.store_handle(slot, Candidate::Lob(lob))?
			}
			(Conversion::Stmt, Value::Stmt(stmt)) => {
				stmt.check()?;
				self.store_handle(slot, Candidate::Stmt(stmt))?
			}
			(Conversion::Rowid, Value::Rowid(rowid)) => {
				rowid.check()?;
				self.store_handle(slot, Candidate::Rowid(rowid))?
			}
			(Conversion::Object, Value::Object(object)) => {
				object.check()?;
				self.store_handle(slot, Candidate::Object(object))?
			}
			(conversion, _) => {
				return Err(match conversion.handle_name() {
					Some(expected) => Error::InvalidHandle {
						expected,
					},
					None => Error::NotSupported {
						operation: "setting a value of a different native kind",
					},
				});
			}
		};

		self.set_indicator(slot, INDICATOR_NOT_NULL);
		let cell = self.cell_mut(slot);
		cell.is_null = false;
		cell.value = stored;
		Ok(())
	}

	fn store_null(&mut self, slot: usize) -> Result<()> {
		self.set_indicator(slot, INDICATOR_NULL);
		self.cell_mut(slot).is_null = true;

		// Object binds need an instance even when null.
		if self.conversion != Conversion::Object || !self.handle(slot).is_null() {
			return Ok(());
		}
		let Some(object_type) = self.object_type.clone() else {
			return Err(Error::NoObjectType);
		};
		let object = Object::create(&self.env, &object_type)?;
		object.set_null(true);
		let reference = Reference::Object(object);
		let tracker = self.tracker_mut()?;
		tracker.clear(slot);
		tracker.adopt(slot, reference.clone());
		self.publish(slot, &reference);
		Ok(())
	}

	fn store_handle(&mut self, slot: usize, candidate: Candidate<'_>) -> Result<DataValue> {
		let tracker = self.tracker_mut()?;
		tracker.assign(slot, candidate);
		let Some(reference) = tracker.get(slot).cloned() else {
			return Ok(DataValue::Empty);
		};
		self.publish(slot, &reference);
		Ok(reference.publish())
	}

	/// Copies a byte value into the slot. Nothing is modified when the value
	/// does not fit.
	fn write_bytes(&mut self, slot: usize, value: &[u8]) -> Result<DataValue> {
		let length = value.len();
		let charset = self.info.charset_form;
		let region = match self.conversion {
			Conversion::NumberAsText => {
				let width = self.scratch_width();
				if length > width {
					return Err(Error::BufferSizeTooSmall {
						length,
						limit: width as u32,
					});
				}
				let number = self
					.env
					.native()
					.number_from_text(value)
					.map_err(|err| Error::native("convert text to number", err))?;
				let offset = slot * width;
				let scratch = self.buffers.scratch.as_deref_mut().unwrap_or_default();
				scratch[offset..offset + length].copy_from_slice(value);
				self.element_mut(slot).copy_from_slice(&number.0);
				Region::Scratch {
					offset,
				}
			}
			Conversion::LobAsBytes => {
				let Some(lob) = self.references().and_then(|tracker| tracker.lob(slot)).cloned() else {
					return Err(Error::InvalidHandle {
						expected: "LOB",
					});
				};
				lob.write(value)?;
				let quantum = self.quantum();
				if let Some(staging) = self.buffers.staging.as_deref_mut() {
					staging[slot].write(value, quantum)?;
				}
				Region::Chunk
			}
			_ if self.is_dynamic => {
				let quantum = self.quantum();
				let dynamic = self.buffers.dynamic.as_deref_mut().unwrap_or_default();
				dynamic[slot].write(value, quantum)?;
				Region::Chunk
			}
			_ => {
				let size = self.size_in_bytes;
				if length > size as usize {
					return Err(Error::BufferSizeTooSmall {
						length,
						limit: size,
					});
				}
				self.element_mut(slot)[..length].copy_from_slice(value);
				if let Some(lengths) = self.buffers.actual_length.as_deref_mut() {
					lengths[slot] = length as u32;
				}
				if let Some(codes) = self.buffers.return_code.as_deref_mut() {
					codes[slot] = 0;
				}
				Region::Fixed {
					offset: slot * size as usize,
				}
			}
		};
		Ok(DataValue::Bytes(BytesRef {
			region,
			length: length as u32,
			charset,
			encoding: Rc::clone(&self.encoding),
		}))
	}
}

#[cfg(test)]
pub mod tests {
	use bindbuf_native::ObjectType;
	use bindbuf_testing::{MockNative, environment};
	use bindbuf_type::{IntervalDs, Type};

	use super::*;
	use crate::VarSpec;

	#[test]
	fn test_oversize_write_keeps_previous_value() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut var = Variable::allocate(&env, VarSpec::of(Type::Raw, 1).size(4)).unwrap();
		var.set_from_bytes(0, b"abcd").unwrap();

		let err = var.set_from_bytes(0, b"abcde").unwrap_err();
		assert_eq!(
			err,
			Error::BufferSizeTooSmall {
				length: 5,
				limit: 4
			}
		);
		assert_eq!(var.value(0).unwrap().as_bytes(), Some(&b"abcd"[..]));
		assert_eq!(var.buffers.actual_length.as_deref().unwrap()[0], 4);
	}

	#[test]
	fn test_number_text_limit() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut var = Variable::allocate(&env, VarSpec::new(Type::Number, NativeKind::Bytes, 1)).unwrap();
		let long = vec![b'1'; 173];
		assert_eq!(
			var.set_from_bytes(0, &long).unwrap_err(),
			Error::BufferSizeTooSmall {
				length: 173,
				limit: 172
			}
		);
		assert!(var.value(0).unwrap().is_null());
	}

	#[test]
	fn test_wrong_native_kind() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut var = Variable::allocate(&env, VarSpec::of(Type::NativeInt, 1)).unwrap();
		assert!(matches!(var.set_from_bytes(0, b"1").unwrap_err(), Error::NotSupported { .. }));
		assert!(matches!(var.set_value(0, Value::Double(1.0)).unwrap_err(), Error::NotSupported { .. }));

		let mut var = Variable::allocate(&env, VarSpec::of(Type::Rowid, 1)).unwrap();
		assert_eq!(
			var.set_value(0, Value::Int64(1)).unwrap_err(),
			Error::InvalidHandle {
				expected: "rowid"
			}
		);
	}

	#[test]
	fn test_position_checked() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut var = Variable::allocate(&env, VarSpec::of(Type::NativeInt, 2)).unwrap();
		assert_eq!(
			var.set_value(2, Value::Int64(1)).unwrap_err(),
			Error::ArraySizeExceeded {
				capacity: 2,
				position: 2
			}
		);
	}

	#[test]
	fn test_set_null_clears_indicator() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut var = Variable::allocate(&env, VarSpec::of(Type::IntervalDs, 1)).unwrap();
		let value = IntervalDs {
			days: 1,
			hours: 2,
			minutes: 3,
			seconds: 4,
			fseconds: 5,
		};
		var.set_value(0, Value::IntervalDs(value)).unwrap();
		assert_eq!(var.buffers.indicator.as_deref().unwrap()[0], INDICATOR_NOT_NULL);
		assert!(matches!(var.get_value(0).unwrap(), Value::IntervalDs(read) if read == value));

		var.set_value(0, Value::Null).unwrap();
		assert_eq!(var.buffers.indicator.as_deref().unwrap()[0], INDICATOR_NULL);
		assert!(var.get_value(0).unwrap().is_null());
	}

	#[test]
	fn test_null_object_gets_instance() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let object_type = ObjectType::new("HR", "ADDRESS", bindbuf_abi::RawHandle::from_addr(0x40));
		let mut var = Variable::allocate(&env, VarSpec::of(Type::Object, 2).object_type(object_type)).unwrap();

		var.set_value(1, Value::Null).unwrap();
		assert_eq!(mock.counters().objects_created, 1);
		let object = var.references().unwrap().object(1).unwrap();
		assert!(object.is_owned());
		assert!(object.is_null());
		assert_eq!(var.handle(1), object.instance());
		assert!(var.get_value(1).unwrap().is_null());

		var.set_value(1, Value::Null).unwrap();
		assert_eq!(mock.counters().objects_created, 1);

		drop(var);
		assert_eq!(mock.counters().objects_freed, 1);
	}

	#[test]
	fn test_closed_handle_rejected() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut var = Variable::allocate(&env, VarSpec::of(Type::Stmt, 1)).unwrap();
		let stmt = Stmt::allocate(&env).unwrap();
		stmt.close().unwrap();
		assert_eq!(
			var.set_from_stmt(0, &stmt).unwrap_err(),
			Error::InvalidHandle {
				expected: "statement"
			}
		);
	}

	#[test]
	fn test_copy_data() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut source = Variable::allocate(&env, VarSpec::of(Type::Varchar, 2).size_in_bytes(8)).unwrap();
		let mut target = Variable::allocate(&env, VarSpec::of(Type::Varchar, 2).size_in_bytes(8)).unwrap();
		source.set_from_bytes(1, b"hello").unwrap();

		target.copy_data(0, &source, 1).unwrap();
		assert_eq!(target.value(0).unwrap().as_bytes(), Some(&b"hello"[..]));
		target.copy_data(0, &source, 0).unwrap();
		assert!(target.value(0).unwrap().is_null());

		assert_eq!(
			target.copy_data(0, &source, 2).unwrap_err(),
			Error::ArraySizeExceeded {
				capacity: 2,
				position: 2
			}
		);
		let numbers = Variable::allocate(&env, VarSpec::of(Type::NativeInt, 2)).unwrap();
		assert!(matches!(target.copy_data(0, &numbers, 0).unwrap_err(), Error::NotSupported { .. }));
	}

	#[test]
	fn test_copy_handle_shares_reference() {
		let mock = MockNative::new();
		let env = environment(&mock);
		let mut source = Variable::allocate(&env, VarSpec::of(Type::Blob, 1)).unwrap();
		let mut target = Variable::allocate(&env, VarSpec::of(Type::Blob, 1)).unwrap();
		let lob = Rc::clone(source.references().unwrap().lob(0).unwrap());
		source.set_from_lob(0, &lob).unwrap();

		target.copy_data(0, &source, 0).unwrap();
		assert_eq!(Rc::strong_count(&lob), 3);
		assert_eq!(target.handle(0), lob.locator());
		assert_eq!(mock.live_descriptors(), 1);
	}
}
