// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity provider seam.
//!
//! The provider is the source of truth for verification status; the
//! document store's `is_verified` column is derived from it, never the
//! other way around.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use roost_accounts_core::AccountId;

use crate::error::{AccountsServerError, Result};

/// Provider-reported state of a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
	/// Whether the provider has confirmed the user's email.
	pub email_verified: bool,
}

/// On-demand lookup against the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
	/// Ground-truth account state for a uid the provider issued.
	async fn get_user(&self, uid: &AccountId) -> Result<ProviderUser>;
}

/// In-memory provider for tests and local wiring.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
	users: Mutex<HashMap<String, ProviderUser>>,
}

impl StaticIdentityProvider {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Register or update a uid's provider-side state.
	pub fn put_user(&self, uid: &AccountId, email_verified: bool) {
		self.users
			.lock()
			.expect("provider map poisoned")
			.insert(uid.as_str().to_string(), ProviderUser { email_verified });
	}
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
	async fn get_user(&self, uid: &AccountId) -> Result<ProviderUser> {
		self.users
			.lock()
			.expect("provider map poisoned")
			.get(uid.as_str())
			.cloned()
			.ok_or_else(|| {
				AccountsServerError::Provider(format!("unknown uid: {uid}"))
			})
	}
}
