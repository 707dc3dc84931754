// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Seam between variable buffers and the native call interface.
//!
//! [`NativeInterface`] is everything the buffer manager asks of the native
//! side: descriptor and handle lifecycle, large object I/O and the value
//! codecs. The handle types wrap native resources in reference counted
//! owners that release them when the last holder goes away.

pub mod codec;
pub mod env;
pub mod handle;
pub mod interface;

pub use codec::{Codec, DateBytes, NumberBytes};
pub use env::Environment;
pub use handle::{Lob, Object, ObjectType, Rowid, Stmt};
pub use interface::{DescriptorKind, NativeInterface, ObjectInstance};
