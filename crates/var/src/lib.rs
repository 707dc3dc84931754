// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Host side buffers for one bound parameter or fetched column.
//!
//! A [`Variable`] owns the parallel per-slot arrays the native call interface
//! reads and writes during execute and fetch: values, null indicators,
//! actual lengths and return codes, or growable chunks when values have no
//! useful upper bound. It tracks the reference counted handles held by slots
//! of large object, cursor, rowid and object variables, converts between the
//! wire layout and the caller's [`Value`]s, and hands buffer pointers to the
//! native interface through the callbacks in [`callback`].

mod alloc;
pub mod callback;
pub mod chunk;
mod conversion;
pub mod data;
pub mod reference;
pub mod variable;

pub use bindbuf_type::{Error, NativeKind, Result, Type};
pub use chunk::{Chunk, DynamicBytes};
pub use data::{BytesRef, Data, DataValue, Region, Value};
pub use reference::{Reference, ReferenceTracker};
pub use variable::{VarSpec, Variable};
