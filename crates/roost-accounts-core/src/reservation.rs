// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Username reservation entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AccountId;

/// The exclusive binding of a normalized username to one owner identity.
///
/// At most one live reservation exists per username, and the owner never
/// changes once set: there is no release or transfer operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameReservation {
	/// The reserved name, normalized (case-folded).
	pub username: String,

	/// Owner identity.
	pub uid: AccountId,

	/// When the name was first reserved, refreshed on idempotent re-claim.
	pub reserved_at: DateTime<Utc>,
}
