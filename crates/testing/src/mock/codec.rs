// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Codec of the mock: numbers travel as length prefixed ASCII, dates as
//! excess-100 century and year bytes, timestamps and intervals live in the
//! descriptor table.

use bindbuf_abi::RawHandle;
use bindbuf_native::{Codec, DateBytes, NumberBytes};
use bindbuf_type::{IntervalDs, IntervalYm, NativeError, Timestamp};

use super::{Descriptor, MockNative};

const INVALID_NUMBER: i32 = 1722;
const MAX_NUMBER_TEXT: usize = NumberBytes::SIZE - 1;
const MILLIS_PER_DAY: i64 = 86_400_000;

fn invalid_number() -> NativeError {
	NativeError::new(INVALID_NUMBER, "invalid number")
}

fn number_text(number: &NumberBytes) -> Result<&str, NativeError> {
	let len = number.0[0] as usize;
	if len == 0 || len > MAX_NUMBER_TEXT {
		return Err(invalid_number());
	}
	std::str::from_utf8(&number.0[1..=len]).map_err(|_| invalid_number())
}

fn encode_number(text: &str) -> Result<NumberBytes, NativeError> {
	if text.is_empty() || text.len() > MAX_NUMBER_TEXT || text.parse::<f64>().is_err() {
		return Err(invalid_number());
	}
	let mut number = NumberBytes::zeroed();
	number.0[0] = text.len() as u8;
	number.0[1..=text.len()].copy_from_slice(text.as_bytes());
	Ok(number)
}

// Days between 1970-01-01 and the given proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
	let y = if month <= 2 {
		year - 1
	} else {
		year
	};
	let era = y.div_euclid(400);
	let yoe = y - era * 400;
	let mp = (month + 9) % 12;
	let doy = (153 * mp + 2) / 5 + day - 1;
	let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
	era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
	let z = days + 719_468;
	let era = z.div_euclid(146_097);
	let doe = z - era * 146_097;
	let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
	let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
	let mp = (5 * doy + 2) / 153;
	let day = doy - (153 * mp + 2) / 5 + 1;
	let month = if mp < 10 {
		mp + 3
	} else {
		mp - 9
	};
	let year = yoe + era * 400 + i64::from(month <= 2);
	(year, month, day)
}

impl MockNative {
	fn with_descriptor<T>(
		&self,
		descriptor: RawHandle,
		f: impl FnOnce(&mut Descriptor) -> Option<T>,
	) -> Result<T, NativeError> {
		let mut state = self.state.borrow_mut();
		f(state.descriptor(descriptor)?).ok_or_else(|| NativeError::new(-3, "descriptor has the wrong kind"))
	}
}

impl Codec for MockNative {
	fn number_to_i64(&self, number: &NumberBytes) -> Result<i64, NativeError> {
		number_text(number)?.parse().map_err(|_| invalid_number())
	}

	fn number_to_u64(&self, number: &NumberBytes) -> Result<u64, NativeError> {
		number_text(number)?.parse().map_err(|_| invalid_number())
	}

	fn number_to_f64(&self, number: &NumberBytes) -> Result<f64, NativeError> {
		number_text(number)?.parse().map_err(|_| invalid_number())
	}

	fn number_to_text(&self, number: &NumberBytes, out: &mut [u8]) -> Result<usize, NativeError> {
		let text = number_text(number)?;
		if text.len() > out.len() {
			return Err(NativeError::new(-5, "text buffer too small"));
		}
		out[..text.len()].copy_from_slice(text.as_bytes());
		Ok(text.len())
	}

	fn number_from_i64(&self, value: i64) -> Result<NumberBytes, NativeError> {
		encode_number(&value.to_string())
	}

	fn number_from_u64(&self, value: u64) -> Result<NumberBytes, NativeError> {
		encode_number(&value.to_string())
	}

	fn number_from_f64(&self, value: f64) -> Result<NumberBytes, NativeError> {
		encode_number(&value.to_string())
	}

	fn number_from_text(&self, text: &[u8]) -> Result<NumberBytes, NativeError> {
		encode_number(std::str::from_utf8(text).map_err(|_| invalid_number())?)
	}

	fn date_to_timestamp(&self, date: &DateBytes) -> Timestamp {
		let [century, year, month, day, hour, minute, second] = date.0;
		let year = (i16::from(century) - 100) * 100 + (i16::from(year) - 100);
		Timestamp::new(year, month, day, hour.saturating_sub(1), minute.saturating_sub(1), second.saturating_sub(1))
	}

	fn date_from_timestamp(&self, value: &Timestamp) -> DateBytes {
		DateBytes([
			(value.year / 100 + 100) as u8,
			(value.year % 100 + 100) as u8,
			value.month,
			value.day,
			value.hour + 1,
			value.minute + 1,
			value.second + 1,
		])
	}

	fn timestamp_get(&self, descriptor: RawHandle, with_tz: bool) -> Result<Timestamp, NativeError> {
		let mut value = self.with_descriptor(descriptor, |d| match d {
			Descriptor::Timestamp(value) => Some(*value),
			_ => None,
		})?;
		if !with_tz {
			value.tz_hour_offset = 0;
			value.tz_minute_offset = 0;
		}
		Ok(value)
	}

	fn timestamp_set(&self, descriptor: RawHandle, value: &Timestamp, with_tz: bool) -> Result<(), NativeError> {
		let mut value = *value;
		if !with_tz {
			value.tz_hour_offset = 0;
			value.tz_minute_offset = 0;
		}
		self.with_descriptor(descriptor, |d| match d {
			Descriptor::Timestamp(stored) => {
				*stored = value;
				Some(())
			}
			_ => None,
		})
	}

	fn timestamp_to_f64(&self, descriptor: RawHandle) -> Result<f64, NativeError> {
		let value = self.timestamp_get(descriptor, false)?;
		let days = days_from_civil(value.year.into(), value.month.into(), value.day.into());
		let millis = days * MILLIS_PER_DAY
			+ (i64::from(value.hour) * 3600 + i64::from(value.minute) * 60 + i64::from(value.second)) * 1000;
		Ok(millis as f64 + f64::from(value.fsecond) / 1_000_000.0)
	}

	fn timestamp_from_f64(&self, descriptor: RawHandle, value: f64) -> Result<(), NativeError> {
		let whole = value.floor() as i64;
		let days = whole.div_euclid(MILLIS_PER_DAY);
		let millis = whole.rem_euclid(MILLIS_PER_DAY);
		let (year, month, day) = civil_from_days(days);
		let seconds = millis / 1000;
		let timestamp = Timestamp::new(
			year as i16,
			month as u8,
			day as u8,
			(seconds / 3600) as u8,
			(seconds / 60 % 60) as u8,
			(seconds % 60) as u8,
		)
		.with_fsecond(((millis % 1000) * 1_000_000) as u32 + ((value - value.floor()) * 1_000_000.0) as u32);
		self.timestamp_set(descriptor, &timestamp, false)
	}

	fn interval_ds_get(&self, descriptor: RawHandle) -> Result<IntervalDs, NativeError> {
		self.with_descriptor(descriptor, |d| match d {
			Descriptor::IntervalDs(value) => Some(*value),
			_ => None,
		})
	}

	fn interval_ds_set(&self, descriptor: RawHandle, value: &IntervalDs) -> Result<(), NativeError> {
		self.with_descriptor(descriptor, |d| match d {
			Descriptor::IntervalDs(stored) => {
				*stored = *value;
				Some(())
			}
			_ => None,
		})
	}

	fn interval_ym_get(&self, descriptor: RawHandle) -> Result<IntervalYm, NativeError> {
		self.with_descriptor(descriptor, |d| match d {
			Descriptor::IntervalYm(value) => Some(*value),
			_ => None,
		})
	}

	fn interval_ym_set(&self, descriptor: RawHandle, value: &IntervalYm) -> Result<(), NativeError> {
		self.with_descriptor(descriptor, |d| match d {
			Descriptor::IntervalYm(stored) => {
				*stored = *value;
				Some(())
			}
			_ => None,
		})
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_civil_round_trip() {
		for days in [-719_468, -1, 0, 1, 11_016, 19_723, 2_932_896] {
			let (y, m, d) = civil_from_days(days);
			assert_eq!(days_from_civil(y, m, d), days);
		}
		assert_eq!(civil_from_days(0), (1970, 1, 1));
		assert_eq!(days_from_civil(2000, 3, 1), 11_017);
	}

	#[test]
	fn test_number_text_round_trip() {
		let mock = MockNative::default();
		let number = mock.number_from_text(b"-12.5").unwrap();
		let mut out = [0u8; 16];
		let len = mock.number_to_text(&number, &mut out).unwrap();
		assert_eq!(&out[..len], b"-12.5");
		assert_eq!(mock.number_to_f64(&number).unwrap(), -12.5);
	}

	#[test]
	fn test_invalid_number() {
		let mock = MockNative::default();
		assert_eq!(mock.number_from_text(b"twelve").unwrap_err().code, INVALID_NUMBER);
		assert_eq!(mock.number_to_i64(&NumberBytes::zeroed()).unwrap_err().code, INVALID_NUMBER);
	}

	#[test]
	fn test_date_round_trip() {
		let mock = MockNative::default();
		let value = Timestamp::new(2024, 2, 29, 23, 59, 58);
		let date = mock.date_from_timestamp(&value);
		assert_eq!(mock.date_to_timestamp(&date), value);
	}
}
