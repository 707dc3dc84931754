// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::rc::Rc;

use bindbuf_abi::INDICATOR_NULL;
use bindbuf_native::{DateBytes, NumberBytes, Object};
use bindbuf_type::{Error, Result, Type};

use super::Variable;
use crate::{
	chunk::DynamicBytes,
	conversion::Conversion,
	data::{BytesRef, DataValue, Region, Value},
	reference::Reference,
};

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
	let mut out = [0u8; N];
	out.copy_from_slice(&bytes[..N]);
	out
}

impl Variable {
	/// Decodes the slot from the native buffers into its cell and returns a
	/// view of it.
	pub fn get_value(&mut self, slot: u32) -> Result<Value<'_>> {
		let slot = self.check_slot(slot)?;
		self.refresh(slot)?;
		Ok(self.view(slot))
	}

	/// View of the slot's cell as last read or written, without decoding.
	pub fn value(&self, slot: u32) -> Result<Value<'_>> {
		let slot = self.check_slot(slot)?;
		Ok(self.view(slot))
	}

	fn is_slot_null(&self, slot: usize) -> bool {
		if let Some(indicators) = self.buffers.object_indicator.as_deref() {
			let indicator = indicators[slot];
			// SAFETY: a non-null pointer was placed there by the native
			// interface or by an owned object still held in the tracker.
			return indicator.is_null() || unsafe { *indicator } == INDICATOR_NULL;
		}
		self.buffers.indicator.as_deref().is_none_or(|indicators| indicators[slot] == INDICATOR_NULL)
	}

	fn refresh(&mut self, slot: usize) -> Result<()> {
		if self.is_slot_null(slot) {
			self.cell_mut(slot).is_null = true;
			return Ok(());
		}
		if let Some(codes) = self.buffers.return_code.as_deref()
			&& codes[slot] != 0
		{
			return Err(Error::ColumnFetch {
				position: slot as u32,
				code: codes[slot],
			});
		}

		let env = Rc::clone(&self.env);
		let native = env.native();
		let value = match self.conversion {
			Conversion::Int64 => DataValue::Int64(i64::from_ne_bytes(array(self.element(slot)))),
			Conversion::Uint64 => DataValue::Uint64(u64::from_ne_bytes(array(self.element(slot)))),
			Conversion::Float => DataValue::Float(f32::from_ne_bytes(array(self.element(slot)))),
			Conversion::Double => DataValue::Double(f64::from_ne_bytes(array(self.element(slot)))),
			Conversion::Boolean => DataValue::Boolean(i32::from_ne_bytes(array(self.element(slot))) != 0),
			Conversion::NumberAsInt64 => DataValue::Int64(
				native.number_to_i64(&self.number(slot)).map_err(|err| Error::native("convert number to integer", err))?,
			),
			Conversion::NumberAsUint64 => DataValue::Uint64(
				native
					.number_to_u64(&self.number(slot))
					.map_err(|err| Error::native("convert number to unsigned integer", err))?,
			),
			Conversion::NumberAsDouble => DataValue::Double(
				native.number_to_f64(&self.number(slot)).map_err(|err| Error::native("convert number to double", err))?,
			),
			Conversion::NumberAsText => {
				let number = self.number(slot);
				let width = self.scratch_width();
				let offset = slot * width;
				let scratch = self.buffers.scratch.as_deref_mut().unwrap_or_default();
				let length = native
					.number_to_text(&number, &mut scratch[offset..offset + width])
					.map_err(|err| Error::native("convert number to text", err))?;
				self.bytes_cell(
					Region::Scratch {
						offset,
					},
					length as u32,
				)
			}
			Conversion::Bytes if self.is_dynamic => {
				let dynamic = self.buffers.dynamic.as_deref_mut().unwrap_or_default();
				let bytes = &mut dynamic[slot];
				bytes.consolidate()?;
				let length = bytes.as_slice().len() as u32;
				self.bytes_cell(Region::Chunk, length)
			}
			Conversion::Bytes => {
				let length = self.buffers.actual_length.as_deref().map_or(0, |lengths| lengths[slot]);
				self.bytes_cell(
					Region::Fixed {
						offset: slot * self.size_in_bytes as usize,
					},
					length,
				)
			}
			Conversion::LobAsBytes => {
				let length = self.read_lob_bytes(slot)?;
				self.bytes_cell(Region::Chunk, length)
			}
			Conversion::Date => DataValue::Timestamp(native.date_to_timestamp(&DateBytes::from_slice(self.element(slot)))),
			Conversion::Timestamp {
				with_tz,
			} => DataValue::Timestamp(
				native.timestamp_get(self.handle(slot), with_tz).map_err(|err| Error::native("get timestamp", err))?,
			),
			Conversion::TimestampAsDouble => DataValue::Double(
				native
					.timestamp_to_f64(self.handle(slot))
					.map_err(|err| Error::native("convert timestamp to double", err))?,
			),
			Conversion::IntervalDs => DataValue::IntervalDs(
				native.interval_ds_get(self.handle(slot)).map_err(|err| Error::native("get interval", err))?,
			),
			Conversion::IntervalYm => DataValue::IntervalYm(
				native.interval_ym_get(self.handle(slot)).map_err(|err| Error::native("get interval", err))?,
			),
			Conversion::Object => {
				self.wrap_fetched_object(slot)?;
				self.references().and_then(|tracker| tracker.get(slot)).map_or(DataValue::Empty, Reference::publish)
			}
			Conversion::Lob | Conversion::Stmt | Conversion::Rowid => {
				self.references().and_then(|tracker| tracker.get(slot)).map_or(DataValue::Empty, Reference::publish)
			}
		};

		let cell = self.cell_mut(slot);
		cell.is_null = false;
		cell.value = value;
		Ok(())
	}

	fn number(&self, slot: usize) -> NumberBytes {
		NumberBytes::from_slice(self.element(slot))
	}

	fn bytes_cell(&self, region: Region, length: u32) -> DataValue {
		DataValue::Bytes(BytesRef {
			region,
			length,
			charset: self.info.charset_form,
			encoding: Rc::clone(&self.encoding),
		})
	}

	/// Streams the slot's large object into its staging chunk.
	fn read_lob_bytes(&mut self, slot: usize) -> Result<u32> {
		let lob = match self.references().and_then(|tracker| tracker.lob(slot)) {
			Some(lob) => Rc::clone(lob),
			None => {
				return Err(Error::InvalidHandle {
					expected: "LOB",
				});
			}
		};
		let length = lob.length()?;
		let config = self.env.config();
		let factor = match lob.r#type() {
			Type::Clob => config.max_bytes_per_character,
			Type::NClob => config.nmax_bytes_per_character,
			_ => 1,
		};
		let length_in_bytes = length.saturating_mul(u64::from(factor));
		let Ok(reserve) = u32::try_from(length_in_bytes) else {
			return Err(Error::NotSupported {
				operation: "reading a LOB longer than 4 GiB as bytes",
			});
		};
		let quantum = self.quantum();
		let staging = self.buffers.staging.as_deref_mut().unwrap_or_default();
		let chunk = staging[slot].allocate(reserve, quantum)?;
		let read = if length > 0 {
			lob.read(1, length, &mut chunk.buffer_mut()[..reserve as usize])?
		} else {
			0
		};
		chunk.set_length(read as u32);
		Ok(chunk.length())
	}

	/// Wraps the instance the native interface fetched into the slot, once
	/// per fetch.
	fn wrap_fetched_object(&mut self, slot: usize) -> Result<()> {
		if self.references().and_then(|tracker| tracker.object(slot)).is_some() {
			return Ok(());
		}
		let Some(object_type) = self.object_type.clone() else {
			return Err(Error::NoObjectType);
		};
		let indicator = self.buffers.object_indicator.as_deref().map_or(std::ptr::null_mut(), |pointers| pointers[slot]);
		let object = Object::wrap(&self.env, &object_type, self.handle(slot), indicator);
		self.tracker_mut()?.adopt(slot, Reference::Object(object));
		Ok(())
	}

	pub(crate) fn view(&self, slot: usize) -> Value<'_> {
		let Some(cell) = self.buffers.cells.as_deref().and_then(|cells| cells.get(slot)) else {
			return Value::Null;
		};
		if cell.is_null {
			return Value::Null;
		}
		let tracker = self.references();
		match &cell.value {
			DataValue::Empty => Value::Null,
			DataValue::Int64(value) => Value::Int64(*value),
			DataValue::Uint64(value) => Value::Uint64(*value),
			DataValue::Float(value) => Value::Float(*value),
			DataValue::Double(value) => Value::Double(*value),
			DataValue::Boolean(value) => Value::Boolean(*value),
			DataValue::Bytes(bytes) => Value::Encoded {
				bytes: self.resolve(slot, bytes),
				encoding: &bytes.encoding,
			},
			DataValue::Timestamp(value) => Value::Timestamp(*value),
			DataValue::IntervalDs(value) => Value::IntervalDs(*value),
			DataValue::IntervalYm(value) => Value::IntervalYm(*value),
			DataValue::Lob(_) => tracker.and_then(|t| t.lob(slot)).map_or(Value::Null, Value::Lob),
			DataValue::Object(_) => tracker.and_then(|t| t.object(slot)).map_or(Value::Null, Value::Object),
			DataValue::Stmt(_) => tracker.and_then(|t| t.stmt(slot)).map_or(Value::Null, Value::Stmt),
			DataValue::Rowid(_) => tracker.and_then(|t| t.rowid(slot)).map_or(Value::Null, Value::Rowid),
		}
	}

	fn resolve(&self, slot: usize, bytes: &BytesRef) -> &[u8] {
		let length = bytes.length as usize;
		match bytes.region {
			Region::Unset => &[],
			Region::Fixed {
				offset,
			} => self.values().get(offset..offset + length).unwrap_or_default(),
			Region::Scratch {
				offset,
			} => self.buffers.scratch.as_deref().and_then(|scratch| scratch.get(offset..offset + length)).unwrap_or_default(),
			Region::Chunk => {
				let chunks = self.buffers.dynamic.as_deref().or(self.buffers.staging.as_deref());
				chunks.and_then(|chunks| chunks.get(slot)).map(DynamicBytes::as_slice).unwrap_or_default()
			}
		}
	}
}
