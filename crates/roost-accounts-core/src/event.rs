// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity provider lifecycle event payloads.

use serde::{Deserialize, Serialize};

/// Payload delivered by the identity provider when an account is created.
///
/// Every field is optional on the wire; the handler treats a missing or
/// empty `uid` as a malformed event and ignores it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityCreatedEvent {
	#[serde(default)]
	pub uid: Option<String>,

	#[serde(default)]
	pub email: Option<String>,

	#[serde(default)]
	pub email_verified: bool,
}

impl IdentityCreatedEvent {
	/// The uid, if the event carries a non-empty one.
	#[must_use]
	pub fn uid(&self) -> Option<&str> {
		self.uid.as_deref().filter(|u| !u.is_empty())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_provider_payload() {
		let event: IdentityCreatedEvent = serde_json::from_str(
			r#"{"uid":"u1","email":"Bob@Example.com","emailVerified":true}"#,
		)
		.unwrap();
		assert_eq!(event.uid(), Some("u1"));
		assert_eq!(event.email.as_deref(), Some("Bob@Example.com"));
		assert!(event.email_verified);
	}

	#[test]
	fn missing_fields_default() {
		let event: IdentityCreatedEvent = serde_json::from_str("{}").unwrap();
		assert_eq!(event.uid(), None);
		assert_eq!(event.email, None);
		assert!(!event.email_verified);
	}

	#[test]
	fn empty_uid_treated_as_missing() {
		let event: IdentityCreatedEvent =
			serde_json::from_str(r#"{"uid":""}"#).unwrap();
		assert_eq!(event.uid(), None);
	}
}
