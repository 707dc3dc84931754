// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use bindbuf_abi::RawHandle;
use bindbuf_type::{IntervalDs, IntervalYm, NativeError, Timestamp};

/// Server NUMBER in its 22 byte wire layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberBytes(pub [u8; 22]);

impl NumberBytes {
	pub const SIZE: usize = 22;

	pub const fn zeroed() -> Self {
		Self([0; 22])
	}

	pub fn from_slice(bytes: &[u8]) -> Self {
		let mut number = Self::zeroed();
		let len = bytes.len().min(Self::SIZE);
		number.0[..len].copy_from_slice(&bytes[..len]);
		number
	}
}

/// Server DATE in its 7 byte wire layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBytes(pub [u8; 7]);

impl DateBytes {
	pub const SIZE: usize = 7;

	pub fn from_slice(bytes: &[u8]) -> Self {
		let mut date = Self([0; 7]);
		let len = bytes.len().min(Self::SIZE);
		date.0[..len].copy_from_slice(&bytes[..len]);
		date
	}
}

/// Value conversions performed by the native interface.
pub trait Codec {
	fn number_to_i64(&self, number: &NumberBytes) -> Result<i64, NativeError>;

	fn number_to_u64(&self, number: &NumberBytes) -> Result<u64, NativeError>;

	fn number_to_f64(&self, number: &NumberBytes) -> Result<f64, NativeError>;

	/// Renders the number as text into `out`, returning the bytes written.
	fn number_to_text(&self, number: &NumberBytes, out: &mut [u8]) -> Result<usize, NativeError>;

	fn number_from_i64(&self, value: i64) -> Result<NumberBytes, NativeError>;

	fn number_from_u64(&self, value: u64) -> Result<NumberBytes, NativeError>;

	fn number_from_f64(&self, value: f64) -> Result<NumberBytes, NativeError>;

	fn number_from_text(&self, text: &[u8]) -> Result<NumberBytes, NativeError>;

	fn date_to_timestamp(&self, date: &DateBytes) -> Timestamp;

	fn date_from_timestamp(&self, value: &Timestamp) -> DateBytes;

	/// Reads a timestamp descriptor; the offset fields are only filled
	/// when `with_tz` is set.
	fn timestamp_get(&self, descriptor: RawHandle, with_tz: bool) -> Result<Timestamp, NativeError>;

	fn timestamp_set(&self, descriptor: RawHandle, value: &Timestamp, with_tz: bool) -> Result<(), NativeError>;

	/// Milliseconds since the Unix epoch.
	fn timestamp_to_f64(&self, descriptor: RawHandle) -> Result<f64, NativeError>;

	fn timestamp_from_f64(&self, descriptor: RawHandle, value: f64) -> Result<(), NativeError>;

	fn interval_ds_get(&self, descriptor: RawHandle) -> Result<IntervalDs, NativeError>;

	fn interval_ds_set(&self, descriptor: RawHandle, value: &IntervalDs) -> Result<(), NativeError>;

	fn interval_ym_get(&self, descriptor: RawHandle) -> Result<IntervalYm, NativeError>;

	fn interval_ym_set(&self, descriptor: RawHandle, value: &IntervalYm) -> Result<(), NativeError>;
}
