// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

/// Callback handled the request; the native interface carries on.
pub const CALLBACK_CONTINUE: i32 = -24200;

/// Callback failed; the error is parked on the variable.
pub const CALLBACK_ERROR: i32 = -1;

pub const INDICATOR_NULL: i16 = -1;
pub const INDICATOR_NOT_NULL: i16 = 0;
