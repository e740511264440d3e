// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite storage layer for the Roost account provisioning system.
//!
//! The pool is constructed explicitly with [`create_pool`] and injected into
//! [`SqliteAccountRepository`]; no global store handle exists. The
//! reservation transaction in [`accounts`] is the one place in the system
//! that coordinates concurrent writers.

pub mod accounts;
pub mod error;
pub mod pool;
pub mod schema;
pub mod testing;

pub use accounts::{AccountRepository, SqliteAccountRepository};
pub use error::{DbError, Result};
pub use pool::create_pool;
pub use schema::create_schema;
