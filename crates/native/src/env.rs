// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use std::{fmt, rc::Rc};

use bindbuf_type::EnvConfig;

use crate::interface::NativeInterface;

/// Connection environment shared by every variable and handle created in it.
pub struct Environment {
	native: Rc<dyn NativeInterface>,
	config: EnvConfig,
}

impl Environment {
	pub fn new(native: Rc<dyn NativeInterface>, config: EnvConfig) -> Rc<Self> {
		Rc::new(Self {
			native,
			config,
		})
	}

	pub fn native(&self) -> &dyn NativeInterface {
		self.native.as_ref()
	}

	pub fn config(&self) -> &EnvConfig {
		&self.config
	}
}

impl fmt::Debug for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Environment").field("config", &self.config).finish_non_exhaustive()
	}
}
