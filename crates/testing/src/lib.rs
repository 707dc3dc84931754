// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Test support: an in-memory native interface that counts every resource it
//! hands out, and a tracing initializer for test binaries.

use std::{rc::Rc, sync::Once};

use bindbuf_native::{Environment, NativeInterface};
use bindbuf_type::EnvConfig;

pub mod mock;

pub use mock::{Counters, MockNative};

static INIT: Once = Once::new();

/// Installs a fmt subscriber filtered by `RUST_LOG`. Safe to call from every
/// test.
pub fn init_tracing() {
	INIT.call_once(|| {
		use tracing_subscriber::{filter::EnvFilter, fmt};
		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
		let _ = fmt().with_env_filter(filter).with_test_writer().with_target(false).try_init();
	});
}

pub fn environment(mock: &Rc<MockNative>) -> Rc<Environment> {
	environment_with(mock, EnvConfig::default())
}

pub fn environment_with(mock: &Rc<MockNative>, config: EnvConfig) -> Rc<Environment> {
	let native: Rc<dyn NativeInterface> = mock.clone();
	Environment::new(native, config)
}
