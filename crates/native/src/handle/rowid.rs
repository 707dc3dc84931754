// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::{cell::Cell, fmt, rc::Rc};

use bindbuf_abi::RawHandle;
use bindbuf_type::{Error, NativeError, Result};
use tracing::instrument;

use crate::{env::Environment, interface::DescriptorKind};

/// Row address descriptor.
pub struct Rowid {
	env: Rc<Environment>,
	handle: RawHandle,
	open: Cell<bool>,
}

impl Rowid {
	#[instrument(name = "native::rowid::allocate", level = "trace", skip(env))]
	pub fn allocate(env: &Rc<Environment>) -> Result<Rc<Self>> {
		let handle = env
			.native()
			.alloc_descriptors(DescriptorKind::Rowid, 1)
			.map_err(|err| Error::native("allocate rowid descriptor", err))?
			.into_iter()
			.next()
			.ok_or_else(|| {
				Error::native("allocate rowid descriptor", NativeError::new(-1, "no descriptor returned"))
			})?;
		Ok(Rc::new(Self {
			env: Rc::clone(env),
			handle,
			open: Cell::new(true),
		}))
	}

	pub fn handle(&self) -> RawHandle {
		self.handle
	}

	pub fn is_open(&self) -> bool {
		self.open.get()
	}

	pub fn check(&self) -> Result<()> {
		if self.open.get() {
			Ok(())
		} else {
			Err(Error::InvalidHandle {
				expected: "rowid",
			})
		}
	}
}

impl Drop for Rowid {
	fn drop(&mut self) {
		if self.open.replace(false) {
			self.env.native().free_descriptors(DescriptorKind::Rowid, &[self.handle]);
		}
	}
}

impl fmt::Debug for Rowid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Rowid").field("handle", &self.handle).finish()
	}
}
