// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Username namespace rules.
//!
//! The namespace is case-folded: every name is normalized with
//! [`normalize_username`] before validation, comparison, or storage, so
//! `"Alice123"` and `"alice123"` are the same name.

/// Minimum username length in characters.
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length in characters.
pub const USERNAME_MAX_LEN: usize = 24;

/// Normalize a requested username: trim surrounding whitespace and
/// case-fold to lowercase.
#[must_use]
pub fn normalize_username(raw: &str) -> String {
	raw.trim().to_lowercase()
}

/// Validates a normalized username.
/// Rules:
/// - 3-24 characters
/// - Lowercase ASCII letters, digits, and `.`, `_`, `-` only
///
/// Expects input that already went through [`normalize_username`]; uppercase
/// input is rejected, not folded.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
	let len = username.chars().count();
	if len < USERNAME_MIN_LEN {
		return Err("username must be at least 3 characters");
	}
	if len > USERNAME_MAX_LEN {
		return Err("username must be at most 24 characters");
	}
	if !username
		.chars()
		.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
	{
		return Err("username can only contain lowercase letters, digits, '.', '_' and '-'");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_valid_names() {
		assert!(validate_username("abc").is_ok());
		assert!(validate_username("alice123").is_ok());
		assert!(validate_username("a.b-c_d").is_ok());
		assert!(validate_username("user_name-01.x").is_ok());
		assert!(validate_username(&"a".repeat(24)).is_ok());
	}

	#[test]
	fn rejects_too_short() {
		assert!(validate_username("").is_err());
		assert!(validate_username("a").is_err());
		assert!(validate_username("ab").is_err());
	}

	#[test]
	fn rejects_too_long() {
		assert!(validate_username(&"a".repeat(25)).is_err());
	}

	#[test]
	fn rejects_invalid_chars() {
		assert!(validate_username("has space").is_err());
		assert!(validate_username("emoji🙂ok").is_err());
		assert!(validate_username("semi;colon").is_err());
		assert!(validate_username("at@sign").is_err());
	}

	#[test]
	fn rejects_unnormalized_uppercase() {
		assert!(validate_username("Alice123").is_err());
		assert!(validate_username(&normalize_username("Alice123")).is_ok());
	}

	#[test]
	fn normalize_trims_and_folds() {
		assert_eq!(normalize_username("  Alice123  "), "alice123");
		assert_eq!(normalize_username("BOB_--x"), "bob_--x");
		assert_eq!(normalize_username(""), "");
	}

	mod properties {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn valid_charset_within_bounds_is_accepted(name in "[a-z0-9._-]{3,24}") {
				prop_assert!(validate_username(&name).is_ok());
			}

			#[test]
			fn normalization_is_idempotent(raw in ".{0,40}") {
				let once = normalize_username(&raw);
				prop_assert_eq!(normalize_username(&once), once.clone());
			}
		}
	}
}
