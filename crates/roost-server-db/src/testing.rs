// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared helpers for tests that need a ready-to-use account database.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::schema::create_schema;

/// In-memory single-connection pool with the account schema applied.
///
/// A single connection keeps the in-memory database alive and shared across
/// the test's queries; it cannot exercise cross-connection contention (use a
/// file-backed pool from [`crate::pool::create_pool`] for that).
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool");

	create_schema(&pool).await.expect("Failed to create schema");

	pool
}
