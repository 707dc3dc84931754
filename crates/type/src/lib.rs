// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Shared vocabulary for the bindbuf crates: the catalog of wire types, the
//! native kinds a caller can exchange values as, the error taxonomy and the
//! environment settings that size buffers.

pub mod config;
pub mod constants;
pub mod error;
pub mod kind;
pub mod r#type;
pub mod value;

pub use config::EnvConfig;
pub use error::{Error, NativeError, Result};
pub use kind::NativeKind;
pub use r#type::{CharsetForm, Type, TypeInfo};
pub use value::{IntervalDs, IntervalYm, Timestamp};
