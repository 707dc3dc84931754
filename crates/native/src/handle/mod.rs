// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 BindBuf

mod lob;
mod object;
mod rowid;
mod stmt;

pub use lob::Lob;
pub use object::{Object, ObjectType};
pub use rowid::Rowid;
pub use stmt::Stmt;
