// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository layer for account and username-reservation operations.
//!
//! All profile writes are merge writes: an upsert that touches only the
//! columns the operation supplies, so a racing writer's fields survive.
//! [`AccountRepository::reserve_username`] is the single coordination point
//! in the system and must keep the name → owner mapping injective under
//! concurrent claims.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::instrument;

use roost_accounts_core::{AccountId, NewProfile, UserProfile, UsernameReservation};

use crate::error::{DbError, Result};

/// Attempts before a conflicted reservation transaction gives up.
const RESERVE_RETRY_BUDGET: u32 = 5;

/// Repository trait for account operations.
#[async_trait]
pub trait AccountRepository: Send + Sync {
	/// Merge-write the profile materialized for a freshly created identity.
	///
	/// Safe to re-run: the upsert fills and overwrites only the supplied
	/// fields, preserving `created_at` and any gameified fields the new
	/// data does not carry.
	async fn create_profile(&self, profile: &NewProfile, now: DateTime<Utc>) -> Result<()>;

	/// Fetch a profile by uid.
	async fn get_profile(&self, uid: &AccountId) -> Result<Option<UserProfile>>;

	/// Atomically claim `username` for `uid`, writing the reservation row
	/// and the owner's profile `username` in one transaction.
	///
	/// The name must already be normalized and validated. Re-claiming a
	/// name the caller already owns is an idempotent success; a name owned
	/// by anyone else is `DbError::Conflict`. Contention beyond the retry
	/// budget is `DbError::Contention`. There is no release or transfer
	/// operation, so the profile `username` and the owned reservation
	/// cannot drift apart: this transaction is the only writer of both.
	async fn reserve_username(
		&self,
		uid: &AccountId,
		username: &str,
		now: DateTime<Utc>,
	) -> Result<()>;

	/// Fetch the reservation for a normalized name.
	async fn get_reservation(&self, username: &str) -> Result<Option<UsernameReservation>>;

	/// Merge-write `is_verified = true` on the caller's profile.
	async fn set_verified(&self, uid: &AccountId, now: DateTime<Utc>) -> Result<()>;

	/// Whether a lowercase email is present in the admin allow-list.
	async fn is_admin_email(&self, email: &str) -> Result<bool>;

	/// Seed the admin allow-list. Operator/test surface; the services only
	/// ever read the list.
	async fn add_admin_email(&self, email: &str) -> Result<()>;
}

/// SQLite implementation of the account repository.
#[derive(Clone)]
pub struct SqliteAccountRepository {
	pool: SqlitePool,
}

impl SqliteAccountRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// One attempt at the reservation transaction: read the mapping, abort
	/// on a foreign owner, otherwise upsert both sides and commit.
	async fn try_reserve(
		&self,
		uid: &AccountId,
		username: &str,
		now: DateTime<Utc>,
	) -> Result<()> {
		let mut tx = self.pool.begin().await?;

		let owner: Option<(String,)> =
			sqlx::query_as("SELECT uid FROM usernames WHERE username = ?")
				.bind(username)
				.fetch_optional(&mut *tx)
				.await?;

		if let Some((owner,)) = owner {
			if owner != uid.as_str() {
				// Dropping the transaction rolls it back; nothing was written.
				return Err(DbError::Conflict(format!(
					"username '{username}' is already reserved"
				)));
			}
		}

		let ts = now.to_rfc3339();

		// The WHERE guard makes ownership sticky at the SQL level: a claim
		// that lost a race with a different owner updates zero rows instead
		// of reassigning the name.
		let claimed = sqlx::query(
			r#"
			INSERT INTO usernames (username, uid, reserved_at)
			VALUES (?, ?, ?)
			ON CONFLICT(username) DO UPDATE SET
				reserved_at = excluded.reserved_at
			WHERE usernames.uid = excluded.uid
			"#,
		)
		.bind(username)
		.bind(uid.as_str())
		.bind(&ts)
		.execute(&mut *tx)
		.await?;

		if claimed.rows_affected() == 0 {
			return Err(DbError::Conflict(format!(
				"username '{username}' is already reserved"
			)));
		}

		sqlx::query(
			r#"
			INSERT INTO users (uid, username, created_at, updated_at)
			VALUES (?, ?, ?, ?)
			ON CONFLICT(uid) DO UPDATE SET
				username = excluded.username,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(uid.as_str())
		.bind(username)
		.bind(&ts)
		.bind(&ts)
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;
		Ok(())
	}
}

/// Whether a sqlx error is a transient SQLite contention failure worth
/// retrying (busy, locked, or a WAL snapshot conflict).
fn is_retryable(err: &sqlx::Error) -> bool {
	match err {
		sqlx::Error::Database(db) => {
			matches!(
				db.code().as_deref(),
				Some("5") | Some("6") | Some("261") | Some("517")
			) || db.message().contains("database is locked")
				|| db.message().contains("database is busy")
		}
		sqlx::Error::PoolTimedOut => true,
		_ => false,
	}
}

// Database row structs for mapping
#[derive(sqlx::FromRow)]
struct ProfileRow {
	uid: String,
	email: Option<String>,
	username: Option<String>,
	role: String,
	is_verified: i64,
	wallet: Option<i64>,
	completed_task: Option<i64>,
	user_level_id: Option<String>,
	created_at: String,
	updated_at: String,
}

impl TryFrom<ProfileRow> for UserProfile {
	type Error = DbError;

	fn try_from(row: ProfileRow) -> Result<Self> {
		Ok(UserProfile {
			uid: AccountId::new(row.uid),
			email: row.email,
			username: row.username,
			role: row
				.role
				.parse()
				.map_err(|e| DbError::InvalidData(format!("invalid role: {e}")))?,
			is_verified: row.is_verified != 0,
			wallet: row.wallet,
			completed_task: row.completed_task,
			user_level_id: row.user_level_id,
			created_at: DateTime::parse_from_rfc3339(&row.created_at)
				.map_err(|e| DbError::InvalidData(format!("invalid created_at: {e}")))?
				.with_timezone(&Utc),
			updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
				.map_err(|e| DbError::InvalidData(format!("invalid updated_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
	username: String,
	uid: String,
	reserved_at: String,
}

impl TryFrom<ReservationRow> for UsernameReservation {
	type Error = DbError;

	fn try_from(row: ReservationRow) -> Result<Self> {
		Ok(UsernameReservation {
			username: row.username,
			uid: AccountId::new(row.uid),
			reserved_at: DateTime::parse_from_rfc3339(&row.reserved_at)
				.map_err(|e| DbError::InvalidData(format!("invalid reserved_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
	#[instrument(skip(self, profile), fields(uid = %profile.uid, role = %profile.role))]
	async fn create_profile(&self, profile: &NewProfile, now: DateTime<Utc>) -> Result<()> {
		let ts = now.to_rfc3339();

		// COALESCE keeps gameified columns a later write does not carry,
		// created_at survives re-delivery of the event.
		sqlx::query(
			r#"
			INSERT INTO users (
				uid, email, username, role, is_verified,
				wallet, completed_task, user_level_id,
				created_at, updated_at
			)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			ON CONFLICT(uid) DO UPDATE SET
				email = excluded.email,
				username = excluded.username,
				role = excluded.role,
				is_verified = excluded.is_verified,
				wallet = COALESCE(excluded.wallet, users.wallet),
				completed_task = COALESCE(excluded.completed_task, users.completed_task),
				user_level_id = COALESCE(excluded.user_level_id, users.user_level_id),
				updated_at = excluded.updated_at
			"#,
		)
		.bind(profile.uid.as_str())
		.bind(&profile.email)
		.bind(&profile.username)
		.bind(profile.role.to_string())
		.bind(if profile.is_verified { 1 } else { 0 })
		.bind(profile.wallet)
		.bind(profile.completed_task)
		.bind(&profile.user_level_id)
		.bind(&ts)
		.bind(&ts)
		.execute(&self.pool)
		.await?;

		tracing::debug!(uid = %profile.uid, role = %profile.role, "user profile written");
		Ok(())
	}

	#[instrument(skip(self), fields(uid = %uid))]
	async fn get_profile(&self, uid: &AccountId) -> Result<Option<UserProfile>> {
		let row: Option<ProfileRow> = sqlx::query_as(
			r#"
			SELECT uid, email, username, role, is_verified,
			       wallet, completed_task, user_level_id,
			       created_at, updated_at
			FROM users
			WHERE uid = ?
			"#,
		)
		.bind(uid.as_str())
		.fetch_optional(&self.pool)
		.await?;

		row.map(UserProfile::try_from).transpose()
	}

	#[instrument(skip(self), fields(uid = %uid, username = %username))]
	async fn reserve_username(
		&self,
		uid: &AccountId,
		username: &str,
		now: DateTime<Utc>,
	) -> Result<()> {
		let mut attempt: u32 = 0;
		loop {
			match self.try_reserve(uid, username, now).await {
				Err(DbError::Sqlx(e)) if is_retryable(&e) => {
					attempt += 1;
					if attempt >= RESERVE_RETRY_BUDGET {
						return Err(DbError::Contention(format!(
							"reservation retry budget exhausted: {e}"
						)));
					}
					let backoff = Duration::from_millis(
						10 * u64::from(attempt) + fastrand::u64(0..10),
					);
					tracing::debug!(attempt, "reservation transaction conflicted, retrying");
					tokio::time::sleep(backoff).await;
				}
				other => return other,
			}
		}
	}

	#[instrument(skip(self))]
	async fn get_reservation(&self, username: &str) -> Result<Option<UsernameReservation>> {
		let row: Option<ReservationRow> = sqlx::query_as(
			"SELECT username, uid, reserved_at FROM usernames WHERE username = ?",
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		row.map(UsernameReservation::try_from).transpose()
	}

	#[instrument(skip(self), fields(uid = %uid))]
	async fn set_verified(&self, uid: &AccountId, now: DateTime<Utc>) -> Result<()> {
		let ts = now.to_rfc3339();

		// Merge semantics: creates the row if an event was lost, relying on
		// the role column default.
		sqlx::query(
			r#"
			INSERT INTO users (uid, is_verified, created_at, updated_at)
			VALUES (?, 1, ?, ?)
			ON CONFLICT(uid) DO UPDATE SET
				is_verified = 1,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(uid.as_str())
		.bind(&ts)
		.bind(&ts)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[instrument(skip(self, email))]
	async fn is_admin_email(&self, email: &str) -> Result<bool> {
		let row: Option<(String,)> =
			sqlx::query_as("SELECT email FROM admin_emails WHERE email = ?")
				.bind(email)
				.fetch_optional(&self.pool)
				.await?;

		Ok(row.is_some())
	}

	#[instrument(skip(self, email))]
	async fn add_admin_email(&self, email: &str) -> Result<()> {
		sqlx::query("INSERT OR IGNORE INTO admin_emails (email) VALUES (?)")
			.bind(email)
			.execute(&self.pool)
			.await?;

		Ok(())
	}
}
