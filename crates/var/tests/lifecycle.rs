// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Every native resource a variable acquires is handed back when it is
//! released, whatever the type and whatever was stored in it.

use std::rc::Rc;

use bindbuf_abi::RawHandle;
use bindbuf_native::{Lob, Object, ObjectType, Stmt};
use bindbuf_testing::{MockNative, environment, init_tracing};
use bindbuf_type::{IntervalDs, IntervalYm, NativeKind, Result, Timestamp, Type};
use bindbuf_var::{Value, VarSpec, Variable};

const CAPACITY: u32 = 4;

fn spec_for(r#type: Type) -> VarSpec {
	let spec = VarSpec::of(r#type, CAPACITY).size(32);
	if r#type == Type::Object {
		spec.object_type(ObjectType::new("HR", "POINT", RawHandle::from_addr(0x40)))
	} else {
		spec
	}
}

fn sample(r#type: Type) -> Option<Value<'static>> {
	let timestamp = Timestamp {
		year: 2024,
		month: 2,
		day: 29,
		hour: 23,
		minute: 59,
		second: 58,
		fsecond: 500,
		tz_hour_offset: 1,
		tz_minute_offset: 30,
	};
	Some(match r#type {
		Type::Varchar | Type::NVarchar | Type::Char | Type::NChar | Type::Raw => Value::Bytes(b"sample"),
		Type::LongVarchar | Type::LongNVarchar | Type::LongRaw => Value::Bytes(b"long sample"),
		Type::NativeInt => Value::Int64(-42),
		Type::NativeFloat => Value::Float(1.5),
		Type::NativeDouble | Type::Number => Value::Double(2.25),
		Type::Boolean => Value::Boolean(true),
		Type::Date | Type::Timestamp | Type::TimestampTz | Type::TimestampLtz => Value::Timestamp(timestamp),
		Type::IntervalDs => Value::IntervalDs(IntervalDs {
			days: 3,
			hours: 4,
			minutes: 5,
			seconds: 6,
			fseconds: 7,
		}),
		Type::IntervalYm => Value::IntervalYm(IntervalYm {
			years: 1,
			months: 11,
		}),
		_ => return None,
	})
}

#[test]
fn test_every_type_releases_its_resources() -> Result<()> {
	init_tracing();
	let mock = MockNative::new();
	let env = environment(&mock);

	for r#type in Type::ALL {
		let mut var = Variable::allocate(&env, spec_for(r#type))?;
		if let Some(value) = sample(r#type) {
			var.set_value(1, value)?;
			assert!(!var.get_value(1)?.is_null(), "{} slot 1 reads back", r#type);
		}
		var.set_value(2, Value::Null)?;
		assert!(var.get_value(2)?.is_null());
		drop(var);
		assert_eq!(mock.live_resources(), 0, "{} leaked", r#type);
	}
	assert_eq!(mock.counters().invalid_frees, 0);
	assert_eq!(mock.counters().temporary_lobs_created, mock.counters().temporary_lobs_freed);
	Ok(())
}

#[test]
fn test_number_as_alternative_native_kinds() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);

	let mut var = Variable::allocate(&env, VarSpec::new(Type::Number, NativeKind::Double, 2))?;
	var.set_value(0, Value::Double(0.125))?;
	assert_eq!(var.get_value(0)?.as_double(), Some(0.125));

	let mut var = Variable::allocate(&env, VarSpec::new(Type::Number, NativeKind::Bytes, 2))?;
	var.set_from_bytes(1, b"-17.5")?;
	assert_eq!(var.get_value(1)?.as_bytes(), Some(&b"-17.5"[..]));

	let mut var = Variable::allocate(&env, VarSpec::new(Type::TimestampTz, NativeKind::Double, 2))?;
	var.set_value(0, Value::Double(86_400.5))?;
	assert_eq!(var.get_value(0)?.as_double(), Some(86_400.5));
	drop(var);
	assert_eq!(mock.live_resources(), 0);
	Ok(())
}

#[test]
fn test_external_handle_outlives_variable() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);

	let lob = Lob::allocate(&env, Type::Clob)?;
	let mut var = Variable::allocate(&env, VarSpec::of(Type::Clob, CAPACITY))?;
	assert_eq!(mock.live_descriptors(), 1 + CAPACITY as usize);

	var.set_from_lob(0, &lob)?;
	assert_eq!(Rc::strong_count(&lob), 2);
	assert_eq!(mock.live_descriptors(), CAPACITY as usize);

	let mut copy = Variable::allocate(&env, VarSpec::of(Type::Clob, 1))?;
	copy.copy_data(0, &var, 0)?;
	assert_eq!(Rc::strong_count(&lob), 3);

	let (_, cells) = copy.get_data();
	assert!(!cells[0].is_null);
	assert_eq!(copy.get_value(0)?.as_lob().map(|handle| handle.locator()), Some(lob.locator()));

	drop(var);
	drop(copy);
	assert_eq!(Rc::strong_count(&lob), 1);
	assert_eq!(mock.live_descriptors(), 1);
	drop(lob);
	assert_eq!(mock.live_resources(), 0);
	Ok(())
}

#[test]
fn test_rebinding_slot_releases_previous_handle() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);

	let mut var = Variable::allocate(&env, VarSpec::of(Type::Stmt, 1))?;
	let first = Stmt::allocate(&env)?;
	let second = Stmt::allocate(&env)?;
	var.set_from_stmt(0, &first)?;
	var.set_from_stmt(0, &first)?;
	assert_eq!(Rc::strong_count(&first), 2);

	var.set_from_stmt(0, &second)?;
	assert_eq!(Rc::strong_count(&first), 1);
	assert_eq!(Rc::strong_count(&second), 2);

	drop(first);
	drop(second);
	assert_eq!(mock.live_statements(), 1);
	drop(var);
	assert_eq!(mock.live_statements(), 0);
	Ok(())
}

#[test]
fn test_null_over_attached_object_keeps_instance() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);
	let object_type = ObjectType::new("HR", "POINT", RawHandle::from_addr(0x40));
	let mut var = Variable::allocate(&env, VarSpec::of(Type::Object, 2).object_type(Rc::clone(&object_type)))?;

	let object = Object::create(&env, &object_type)?;
	var.set_from_object(0, &object)?;
	var.set_value(0, Value::Null)?;
	assert!(!var.get_value(0)?.is_null());
	assert_eq!(Rc::strong_count(&object), 2);

	object.set_null(true);
	assert!(var.get_value(0)?.is_null());

	var.set_value(1, Value::Null)?;
	assert!(var.get_value(1)?.is_null());
	assert_eq!(mock.live_objects(), 2);

	drop(var);
	assert_eq!(Rc::strong_count(&object), 1);
	drop(object);
	assert_eq!(mock.live_resources(), 0);
	Ok(())
}

#[test]
fn test_failed_allocation_leaves_nothing_behind() {
	let mock = MockNative::new();
	let env = environment(&mock);

	for successes in 0..CAPACITY {
		mock.fail_after(successes);
		assert!(Variable::allocate(&env, VarSpec::of(Type::Blob, CAPACITY)).is_err());
		assert_eq!(mock.live_resources(), 0);
	}
	mock.fail_after(1);
	assert!(Variable::allocate(&env, VarSpec::of(Type::IntervalYm, CAPACITY)).is_ok());
	assert_eq!(mock.live_resources(), 0);
	assert_eq!(mock.counters().invalid_frees, 0);
}
