// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::{cell::Cell, fmt, rc::Rc};

use bindbuf_abi::RawHandle;
use bindbuf_type::{Error, NativeError, Result, Type};
use tracing::{instrument, warn};

use crate::{env::Environment, interface::DescriptorKind};

/// Large object locator.
///
/// The locator is freed, together with any temporary object it refers to,
/// when the last reference is dropped or on [`Lob::close`].
pub struct Lob {
	env: Rc<Environment>,
	r#type: Type,
	kind: DescriptorKind,
	locator: RawHandle,
	temporary: Cell<bool>,
	open: Cell<bool>,
}

impl Lob {
	#[instrument(name = "native::lob::allocate", level = "trace", skip(env))]
	pub fn allocate(env: &Rc<Environment>, r#type: Type) -> Result<Rc<Self>> {
		let kind = match r#type {
			Type::BFile => DescriptorKind::File,
			Type::Clob | Type::NClob | Type::Blob => DescriptorKind::Lob,
			_ => {
				return Err(Error::NotSupported {
					operation: "LOB locator for a non-LOB type",
				});
			}
		};
		let locator = env
			.native()
			.alloc_descriptors(kind, 1)
			.map_err(|err| Error::native("allocate LOB locator", err))?
			.into_iter()
			.next()
			.ok_or_else(|| Error::native("allocate LOB locator", NativeError::new(-1, "no locator returned")))?;

		Ok(Rc::new(Self {
			env: Rc::clone(env),
			r#type,
			kind,
			locator,
			temporary: Cell::new(false),
			open: Cell::new(true),
		}))
	}

	pub fn r#type(&self) -> Type {
		self.r#type
	}

	pub fn locator(&self) -> RawHandle {
		self.locator
	}

	pub fn is_open(&self) -> bool {
		self.open.get()
	}

	pub fn is_temporary(&self) -> bool {
		self.temporary.get()
	}

	pub fn check(&self) -> Result<()> {
		if self.open.get() {
			Ok(())
		} else {
			Err(Error::InvalidHandle {
				expected: "LOB",
			})
		}
	}

	pub fn create_temporary(&self) -> Result<()> {
		self.check()?;
		self.env
			.native()
			.create_temporary_lob(self.locator, self.r#type)
			.map_err(|err| Error::native("create temporary LOB", err))?;
		self.temporary.set(true);
		Ok(())
	}

	/// Length in characters for character large objects, bytes otherwise.
	pub fn length(&self) -> Result<u64> {
		self.check()?;
		self.env.native().lob_length(self.locator).map_err(|err| Error::native("get LOB length", err))
	}

	pub fn read(&self, offset: u64, amount: u64, buffer: &mut [u8]) -> Result<u64> {
		self.check()?;
		self.env
			.native()
			.read_lob(self.locator, offset, amount, buffer)
			.map_err(|err| Error::native("read from LOB", err))
	}

	/// Replaces the content of the large object with `data`.
	pub fn write(&self, data: &[u8]) -> Result<()> {
		self.check()?;
		self.env.native().write_lob(self.locator, data).map_err(|err| Error::native("write to LOB", err))
	}

	pub fn close(&self) -> Result<()> {
		self.check()?;
		let result = self.release();
		self.open.set(false);
		result
	}

	fn release(&self) -> Result<()> {
		let native = self.env.native();
		let mut result = Ok(());
		if self.temporary.replace(false) {
			result = native.free_temporary_lob(self.locator).map_err(|err| Error::native("free temporary LOB", err));
		}
		native.free_descriptors(self.kind, &[self.locator]);
		result
	}
}

impl Drop for Lob {
	fn drop(&mut self) {
		if self.open.replace(false) {
			if let Err(err) = self.release() {
				warn!(error = %err, "failed to release LOB");
			}
		}
	}
}

impl fmt::Debug for Lob {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Lob")
			.field("type", &self.r#type)
			.field("locator", &self.locator)
			.field("temporary", &self.temporary.get())
			.field("open", &self.open.get())
			.finish()
	}
}
