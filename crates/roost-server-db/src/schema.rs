// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Idempotent schema bootstrap for the account tables.
//!
//! Three tables mirror the three persisted entities: `users` (profiles,
//! keyed by uid), `usernames` (the name → owner mapping, keyed by the
//! normalized name), and `admin_emails` (the read-only allow-list). The
//! store enforces nothing beyond the primary keys; the invariants live in
//! the repository logic.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

/// Create the account tables if they do not exist.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), DbError> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS users (
			uid TEXT PRIMARY KEY,
			email TEXT,
			username TEXT,
			role TEXT NOT NULL DEFAULT 'regular',
			is_verified INTEGER NOT NULL DEFAULT 0,
			wallet INTEGER,
			completed_task INTEGER,
			user_level_id TEXT,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS usernames (
			username TEXT PRIMARY KEY,
			uid TEXT NOT NULL,
			reserved_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS admin_emails (
			email TEXT PRIMARY KEY
		)
		"#,
	)
	.execute(pool)
	.await?;

	Ok(())
}
