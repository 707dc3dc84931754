// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

/// Widest textual rendering of a NUMBER, in characters.
pub const NUMBER_AS_TEXT_CHARS: u32 = 172;

/// Chunk descriptors are added in groups of this many.
pub const CHUNK_GROWTH: usize = 8;

pub const DEFAULT_CHUNK_SIZE: u32 = 65536;

/// Largest element the native interface accepts inline; larger byte
/// variables are exchanged piecewise through callbacks.
pub const DEFAULT_MAX_BASIC_BUFFER_SIZE: u32 = 32767;

pub const DEFAULT_MAX_BYTES_PER_CHARACTER: u32 = 4;

/// Upper bound on capacity times element size for a fixed value array.
pub const MAX_BUFFER_BYTES: u64 = i32::MAX as u64;
