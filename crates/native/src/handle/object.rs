// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::{cell::Cell, fmt, rc::Rc};

use bindbuf_abi::{INDICATOR_NOT_NULL, INDICATOR_NULL, RawHandle};
use bindbuf_type::{Error, Result};
use tracing::instrument;

use crate::env::Environment;

/// Named user defined type. The type descriptor is owned by the native
/// interface's type cache and outlives this value.
#[derive(Debug)]
pub struct ObjectType {
	schema: String,
	name: String,
	type_descriptor: RawHandle,
}

impl ObjectType {
	pub fn new(schema: impl Into<String>, name: impl Into<String>, type_descriptor: RawHandle) -> Rc<Self> {
		Rc::new(Self {
			schema: schema.into(),
			name: name.into(),
			type_descriptor,
		})
	}

	pub fn schema(&self) -> &str {
		&self.schema
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn type_descriptor(&self) -> RawHandle {
		self.type_descriptor
	}
}

/// Instance of an [`ObjectType`].
///
/// Instances created here are owned and freed on drop. Instances produced
/// by a fetch belong to the native interface and are only wrapped.
pub struct Object {
	env: Rc<Environment>,
	object_type: Rc<ObjectType>,
	instance: RawHandle,
	indicator: *mut i16,
	owned: bool,
	open: Cell<bool>,
}

impl Object {
	#[instrument(name = "native::object::create", level = "trace", skip(env, object_type), fields(type_name = %object_type.name()))]
	pub fn create(env: &Rc<Environment>, object_type: &Rc<ObjectType>) -> Result<Rc<Self>> {
		let created = env
			.native()
			.create_object(object_type.type_descriptor())
			.map_err(|err| Error::native("create object instance", err))?;
		Ok(Rc::new(Self {
			env: Rc::clone(env),
			object_type: Rc::clone(object_type),
			instance: created.instance,
			indicator: created.indicator,
			owned: true,
			open: Cell::new(true),
		}))
	}

	pub fn wrap(
		env: &Rc<Environment>,
		object_type: &Rc<ObjectType>,
		instance: RawHandle,
		indicator: *mut i16,
	) -> Rc<Self> {
		Rc::new(Self {
			env: Rc::clone(env),
			object_type: Rc::clone(object_type),
			instance,
			indicator,
			owned: false,
			open: Cell::new(true),
		})
	}

	pub fn object_type(&self) -> &Rc<ObjectType> {
		&self.object_type
	}

	pub fn instance(&self) -> RawHandle {
		self.instance
	}

	pub fn indicator(&self) -> *mut i16 {
		self.indicator
	}

	pub fn is_owned(&self) -> bool {
		self.owned
	}

	pub fn check(&self) -> Result<()> {
		if self.open.get() {
			Ok(())
		} else {
			Err(Error::InvalidHandle {
				expected: "object",
			})
		}
	}

	/// Whether the instance as a whole is atomically null.
	pub fn is_null(&self) -> bool {
		// SAFETY: the indicator is provided by the native interface together
		// with the instance and lives as long as the instance does.
		!self.indicator.is_null() && unsafe { *self.indicator } == INDICATOR_NULL
	}

	pub fn set_null(&self, null: bool) {
		if self.indicator.is_null() {
			return;
		}
		// SAFETY: see `is_null`.
		unsafe {
			*self.indicator = if null {
				INDICATOR_NULL
			} else {
				INDICATOR_NOT_NULL
			};
		}
	}

	pub fn close(&self) -> Result<()> {
		self.check()?;
		self.release();
		Ok(())
	}

	fn release(&self) {
		if self.open.replace(false) && self.owned {
			self.env.native().free_object(self.instance);
		}
	}
}

impl Drop for Object {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Object {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Object")
			.field("type", &self.object_type.name())
			.field("instance", &self.instance)
			.field("owned", &self.owned)
			.finish()
	}
}
