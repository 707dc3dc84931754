// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use bindbuf_type::{Error, NativeKind, Result};
use tracing::{debug, instrument};

use super::Variable;
use crate::conversion::Conversion;

impl Variable {
	/// Changes the element size of a fixed byte variable. All slots are null
	/// afterwards.
	#[instrument(name = "var::resize", level = "trace", skip(self))]
	pub fn resize(&mut self, size_in_bytes: u32) -> Result<()> {
		self.check_native(NativeKind::Bytes, "resizing")?;
		match self.conversion {
			Conversion::Bytes if !self.is_dynamic => {}
			Conversion::Bytes | Conversion::LobAsBytes => return Ok(()),
			_ => {
				return Err(Error::NotSupported {
					operation: "resizing",
				});
			}
		}
		self.check_slot(0)?;

		let buffers = &mut self.buffers;
		buffers.values = None;
		buffers.indicator = None;
		buffers.actual_length = None;
		buffers.return_code = None;
		buffers.cells = None;
		self.size_in_bytes = size_in_bytes.max(1);
		self.allocate_buffers()
	}

	/// Reallocates every buffer for `capacity` slots, dropping all values.
	#[instrument(name = "var::grow", level = "trace", skip(self))]
	pub(crate) fn grow(&mut self, capacity: u32) -> Result<()> {
		debug!(from = self.capacity, to = capacity, "growing variable for returned rows");
		self.finalize_buffers();
		self.capacity = capacity;
		self.element_count = self.element_count.min(capacity);
		self.init_buffers()
	}

	/// Moves a dynamic byte variable onto large objects, one per slot,
	/// carrying over the values already written.
	#[instrument(name = "var::convert_to_lob", level = "trace", skip(self), fields(wire = %self.info.r#type))]
	pub fn convert_to_lob(&mut self) -> Result<()> {
		if !self.is_dynamic || self.conversion != Conversion::Bytes {
			return Err(Error::NotSupported {
				operation: "converting to a LOB",
			});
		}
		self.check_slot(0)?;

		let Some(mut previous) = self.buffers.dynamic.take() else {
			return Ok(());
		};
		let from = self.info.r#type;
		self.info = from.lob_counterpart().info();
		self.size_in_bytes = self.info.size_in_bytes;
		self.is_dynamic = false;
		self.conversion = Conversion::LobAsBytes;
		self.init_buffers()?;

		let mut carried = 0;
		for (slot, bytes) in previous.iter_mut().enumerate() {
			if bytes.num_chunks() == 0 {
				continue;
			}
			bytes.consolidate()?;
			self.write_bytes_to_lob(slot, bytes.as_slice())?;
			carried += 1;
		}
		debug!(from = %from, to = %self.info.r#type, carried, "converted variable to LOB");
		Ok(())
	}

	fn write_bytes_to_lob(&self, slot: usize, value: &[u8]) -> Result<()> {
		let Some(lob) = self.references().and_then(|tracker| tracker.lob(slot)) else {
			return Err(Error::InvalidHandle {
				expected: "LOB",
			});
		};
		lob.write(value)
	}
}
