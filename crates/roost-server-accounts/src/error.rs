// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the account services.

use thiserror::Error;

use roost_server_db::DbError;

/// Errors surfaced by the account services.
///
/// `NOT_VERIFIED` is deliberately absent: it is a soft business outcome
/// carried in [`crate::MarkVerifiedResponse`], not an error.
#[derive(Debug, Error)]
pub enum AccountsServerError {
	/// No caller identity was supplied, or it was empty.
	#[error("unauthenticated")]
	Unauthenticated,

	/// Requested username failed syntax validation.
	#[error("invalid username: {0}")]
	InvalidUsername(&'static str),

	/// The name is reserved by a different identity.
	#[error("username already taken")]
	UsernameTaken,

	/// Store contention outlasted the retry budget; the whole call can be
	/// retried later.
	#[error("transient store contention: {0}")]
	Transient(String),

	/// Identity provider lookup failed.
	#[error("identity provider error: {0}")]
	Provider(String),

	/// Any other storage failure.
	#[error("database error: {0}")]
	Database(DbError),
}

impl From<DbError> for AccountsServerError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::Conflict(_) => AccountsServerError::UsernameTaken,
			DbError::Contention(msg) => AccountsServerError::Transient(msg),
			other => AccountsServerError::Database(other),
		}
	}
}

/// Result type for account service operations.
pub type Result<T> = std::result::Result<T, AccountsServerError>;
