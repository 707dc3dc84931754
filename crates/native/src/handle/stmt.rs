// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::{cell::Cell, fmt, rc::Rc};

use bindbuf_abi::RawHandle;
use bindbuf_type::{Error, Result};
use tracing::instrument;

use crate::env::Environment;

/// Statement handle, typically a cursor returned from PL/SQL.
pub struct Stmt {
	env: Rc<Environment>,
	handle: RawHandle,
	open: Cell<bool>,
}

impl Stmt {
	#[instrument(name = "native::stmt::allocate", level = "trace", skip(env))]
	pub fn allocate(env: &Rc<Environment>) -> Result<Rc<Self>> {
		let handle = env.native().alloc_statement().map_err(|err| Error::native("allocate statement handle", err))?;
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
				expected: "statement",
			})
		}
	}

	pub fn close(&self) -> Result<()> {
		self.check()?;
		self.release();
		Ok(())
	}

	fn release(&self) {
		if self.open.replace(false) {
			self.env.native().free_statement(self.handle);
		}
	}
}

impl Drop for Stmt {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Stmt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Stmt")
			.field("handle", &self.handle)
			.field("open", &self.open.get())
			.finish()
	}
}
