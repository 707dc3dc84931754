// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

use serde::{Deserialize, Serialize};

/// Broken down date and time as exchanged with callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
	pub year: i16,
	pub month: u8,
	pub day: u8,
	pub hour: u8,
	pub minute: u8,
	pub second: u8,
	/// Nanoseconds
	pub fsecond: u32,
	pub tz_hour_offset: i8,
	pub tz_minute_offset: i8,
}

impl Timestamp {
	pub fn new(year: i16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
		Self {
			year,
			month,
			day,
			hour,
			minute,
			second,
			..Self::default()
		}
	}

	pub fn with_fsecond(mut self, fsecond: u32) -> Self {
		self.fsecond = fsecond;
		self
	}

	pub fn with_offset(mut self, hours: i8, minutes: i8) -> Self {
		self.tz_hour_offset = hours;
		self.tz_minute_offset = minutes;
		self
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalDs {
	pub days: i32,
	pub hours: i32,
	pub minutes: i32,
	pub seconds: i32,
	pub fseconds: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalYm {
	pub years: i32,
	pub months: i32,
}
