// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User profile types.
//!
//! One record type covers both roles: admin profiles simply leave the
//! gameified fields (`wallet`, `completed_task`, `user_level_id`) unset
//! instead of splitting into two profile shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Role};

/// Starting level assigned to regular accounts.
pub const DEFAULT_USER_LEVEL: &str = "beginner";

/// A user's profile record as persisted in the `users` table.
///
/// Created exactly once by the identity event handler on first sight of a
/// uid and merged in place afterwards; never deleted by this system.
///
/// # PII Handling
///
/// `email` and `username` are user-identifying; redact them in logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// Provider-issued identity this profile belongs to.
	pub uid: AccountId,

	/// Lowercased email, if the provider supplied one.
	pub email: Option<String>,

	/// Reserved username (case-folded), or the email local-part default
	/// until the user reserves one.
	pub username: Option<String>,

	/// Role decided at provisioning time.
	pub role: Role,

	/// Whether the provider has confirmed the email. Promoted by the
	/// verification service, never demoted.
	pub is_verified: bool,

	/// Gameified balance; regular accounts only.
	pub wallet: Option<i64>,

	/// Gameified task counter; regular accounts only.
	pub completed_task: Option<i64>,

	/// Gameified level id; regular accounts only.
	pub user_level_id: Option<String>,

	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Field set the identity event handler materializes for a new account.
///
/// Timestamps are supplied by the storage layer at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
	pub uid: AccountId,
	pub email: Option<String>,
	pub username: Option<String>,
	pub role: Role,
	pub is_verified: bool,
	pub wallet: Option<i64>,
	pub completed_task: Option<i64>,
	pub user_level_id: Option<String>,
}

impl NewProfile {
	/// Build the profile for a freshly created identity.
	///
	/// `email` must already be lowercased (empty is treated as absent).
	/// The username defaults to the email local part; it is a display
	/// default only and does not reserve anything in the username
	/// namespace.
	#[must_use]
	pub fn for_created_identity(
		uid: AccountId,
		email: Option<String>,
		email_verified: bool,
		is_admin: bool,
	) -> Self {
		let email = email.filter(|e| !e.is_empty());
		let username = email
			.as_deref()
			.map(|e| e.split('@').next().unwrap_or(e).to_string());
		let role = if is_admin { Role::Admin } else { Role::Regular };

		let (wallet, completed_task, user_level_id) = if role.is_regular() {
			(Some(0), Some(0), Some(DEFAULT_USER_LEVEL.to_string()))
		} else {
			(None, None, None)
		};

		Self {
			uid,
			email,
			username,
			role,
			is_verified: email_verified,
			wallet,
			completed_task,
			user_level_id,
		}
	}
}
