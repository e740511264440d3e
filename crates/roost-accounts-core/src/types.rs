// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity and role types.
//!
//! [`AccountId`] wraps the provider-issued uid as an opaque string rather
//! than a UUID: the identity provider mints these ids and this system never
//! generates one itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AccountsError;

/// Opaque, provider-issued unique caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
	/// Create an ID from a provider-issued uid.
	pub fn new(uid: impl Into<String>) -> Self {
		Self(uid.into())
	}

	/// Get the uid as a string slice.
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Consume the ID, returning the inner uid.
	#[must_use]
	pub fn into_inner(self) -> String {
		self.0
	}

	/// Whether the uid is empty. Providers never issue empty uids, so an
	/// empty value means the caller is not authenticated.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<String> for AccountId {
	fn from(uid: String) -> Self {
		Self(uid)
	}
}

impl From<&str> for AccountId {
	fn from(uid: &str) -> Self {
		Self(uid.to_string())
	}
}

/// Profile role, decided once at provisioning time from the admin
/// allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Email was present in the admin allow-list at account creation.
	Admin,
	/// Everyone else; carries the gameified profile fields.
	Regular,
}

impl Role {
	/// Whether gameified fields (wallet, completed tasks, level) apply.
	#[must_use]
	pub fn is_regular(&self) -> bool {
		matches!(self, Role::Regular)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Admin => write!(f, "admin"),
			Role::Regular => write!(f, "regular"),
		}
	}
}

impl std::str::FromStr for Role {
	type Err = AccountsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"admin" => Ok(Role::Admin),
			"regular" => Ok(Role::Regular),
			_ => Err(AccountsError::InvalidRole(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn account_id_round_trips() {
		let id = AccountId::new("uid-123");
		assert_eq!(id.as_str(), "uid-123");
		assert_eq!(id.to_string(), "uid-123");
		assert!(!id.is_empty());
		assert!(AccountId::new("").is_empty());
	}

	#[test]
	fn role_display_and_parse() {
		assert_eq!(Role::Admin.to_string(), "admin");
		assert_eq!(Role::Regular.to_string(), "regular");
		assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
		assert_eq!("regular".parse::<Role>().unwrap(), Role::Regular);
		assert!("superuser".parse::<Role>().is_err());
	}

	#[test]
	fn role_serializes_snake_case() {
		assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
		assert_eq!(
			serde_json::to_string(&Role::Regular).unwrap(),
			"\"regular\""
		);
	}
}
