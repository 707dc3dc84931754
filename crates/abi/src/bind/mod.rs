// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Buffers and callbacks exchanged while binding and defining

mod arrays;
mod buffer;
mod callback;

pub use arrays::*;
pub use buffer::*;
pub use callback::*;
