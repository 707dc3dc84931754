// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

//! Lifecycle of the reference counted native handles against the counting
//! double.

use std::rc::Rc;

use bindbuf_abi::RawHandle;
use bindbuf_native::{DescriptorKind, Lob, Object, ObjectType, Rowid, Stmt};
use bindbuf_testing::{MockNative, environment};
use bindbuf_type::{Error, Result, Type};

#[test]
fn test_lob_freed_on_last_drop() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);

	let lob = Lob::allocate(&env, Type::Blob)?;
	let shared = Rc::clone(&lob);
	assert_eq!(mock.live_descriptors_of(DescriptorKind::Lob), 1);
	drop(lob);
	assert_eq!(mock.live_descriptors_of(DescriptorKind::Lob), 1);
	drop(shared);
	assert_eq!(mock.live_descriptors(), 0);
	Ok(())
}

#[test]
fn test_bfile_uses_file_descriptor() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);
	let _file = Lob::allocate(&env, Type::BFile)?;
	assert_eq!(mock.live_descriptors_of(DescriptorKind::File), 1);
	assert!(matches!(Lob::allocate(&env, Type::Varchar), Err(Error::NotSupported { .. })));
	Ok(())
}

#[test]
fn test_temporary_lob_round_trip() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);

	let lob = Lob::allocate(&env, Type::Clob)?;
	lob.create_temporary()?;
	assert!(lob.is_temporary());
	lob.write("héllo".as_bytes())?;
	assert_eq!(lob.length()?, 5);

	let mut buffer = vec![0u8; 16];
	let read = lob.read(1, 5, &mut buffer)?;
	assert_eq!(&buffer[..read as usize], "héllo".as_bytes());

	lob.close()?;
	assert_eq!(mock.live_temporary_lobs(), 0);
	assert_eq!(mock.live_descriptors(), 0);
	assert_eq!(
		lob.write(b"late").unwrap_err(),
		Error::InvalidHandle {
			expected: "LOB"
		}
	);
	Ok(())
}

#[test]
fn test_closed_lob_is_not_freed_twice() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);
	let lob = Lob::allocate(&env, Type::Blob)?;
	lob.close()?;
	drop(lob);
	assert_eq!(mock.counters().descriptors_freed, 1);
	assert_eq!(mock.counters().invalid_frees, 0);
	Ok(())
}

#[test]
fn test_stmt_close() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);

	let stmt = Stmt::allocate(&env)?;
	let shared = Rc::clone(&stmt);
	drop(shared);
	assert_eq!(mock.live_statements(), 1);

	stmt.close()?;
	assert!(!stmt.is_open());
	assert_eq!(mock.live_statements(), 0);
	assert!(stmt.check().is_err());
	drop(stmt);
	assert_eq!(mock.counters().invalid_frees, 0);
	Ok(())
}

#[test]
fn test_rowid_descriptor() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);
	let rowid = Rowid::allocate(&env)?;
	assert_eq!(mock.live_descriptors_of(DescriptorKind::Rowid), 1);
	assert!(!rowid.handle().is_null());
	drop(rowid);
	assert_eq!(mock.live_descriptors(), 0);
	Ok(())
}

#[test]
fn test_object_created_and_wrapped() -> Result<()> {
	let mock = MockNative::new();
	let env = environment(&mock);
	let object_type = ObjectType::new("HR", "ADDRESS", RawHandle::from_addr(0x77));

	let owned = Object::create(&env, &object_type)?;
	assert!(owned.is_owned());
	assert_eq!(mock.live_objects(), 1);
	owned.set_null(true);
	assert!(owned.is_null());
	owned.set_null(false);
	assert!(!owned.is_null());

	let fetched = mock.fetched_object();
	let wrapped = Object::wrap(&env, &object_type, fetched.instance, fetched.indicator);
	assert!(!wrapped.is_owned());
	drop(wrapped);
	assert_eq!(mock.live_objects(), 2);

	drop(owned);
	assert_eq!(mock.live_objects(), 1);
	assert_eq!(mock.counters().objects_freed, 1);
	Ok(())
}

#[test]
fn test_allocation_failure_is_reported() {
	let mock = MockNative::new();
	let env = environment(&mock);
	mock.fail_after(0);
	let err = Lob::allocate(&env, Type::Blob).unwrap_err();
	assert!(matches!(
		err,
		Error::Native {
			action: "allocate LOB locator",
			..
		}
	));
	assert_eq!(mock.live_resources(), 0);
}
