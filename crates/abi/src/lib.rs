// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! C ABI shapes shared with the native call interface.
//!
//! The native interface fills and reads variable buffers through raw
//! pointers. This crate defines the FFI-safe structures used to hand those
//! pointers across, the callback signatures the interface invokes during
//! execute and fetch, and the status codes the callbacks return.

pub mod bind;
pub mod constants;
pub mod handle;

pub use bind::*;
pub use constants::*;
pub use handle::RawHandle;
