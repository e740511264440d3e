// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The three account operations.
//!
//! Every invocation is short-lived and stateless; the service holds only
//! injected handles. Authentication and validation failures are rejected
//! before the store is touched.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use roost_accounts_core::{
	normalize_username, validate_username, AccountId, IdentityCreatedEvent, NewProfile,
};
use roost_server_db::AccountRepository;

use crate::error::{AccountsServerError, Result};
use crate::provider::IdentityProvider;

/// Soft-failure reason returned while the provider still reports the email
/// as unverified.
const NOT_VERIFIED: &str = "NOT_VERIFIED";

/// Successful reservation result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveUsernameResponse {
	pub ok: bool,
	/// The normalized name that was reserved.
	pub username: String,
}

/// Outcome of a verification promotion attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkVerifiedResponse {
	pub ok: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
}

impl MarkVerifiedResponse {
	fn verified() -> Self {
		Self {
			ok: true,
			reason: None,
		}
	}

	fn not_verified() -> Self {
		Self {
			ok: false,
			reason: Some(NOT_VERIFIED.to_string()),
		}
	}
}

/// Account provisioning and maintenance service.
pub struct AccountsService {
	repo: Arc<dyn AccountRepository>,
	provider: Arc<dyn IdentityProvider>,
}

impl AccountsService {
	pub fn new(repo: Arc<dyn AccountRepository>, provider: Arc<dyn IdentityProvider>) -> Self {
		Self { repo, provider }
	}

	/// Reject calls that arrive without a resolved, non-empty identity.
	fn require_caller<'a>(caller: Option<&'a AccountId>) -> Result<&'a AccountId> {
		match caller {
			Some(uid) if !uid.is_empty() => Ok(uid),
			_ => Err(AccountsServerError::Unauthenticated),
		}
	}

	/// Reserve a globally-unique username for the caller.
	///
	/// The requested name is trimmed and case-folded, validated against
	/// `^[a-z0-9._-]{3,24}$`, then claimed through the store's atomic
	/// reservation transaction. Re-claiming a name the caller already owns
	/// (under any casing) succeeds idempotently.
	#[instrument(skip(self, caller, requested))]
	pub async fn reserve_username(
		&self,
		caller: Option<&AccountId>,
		requested: &str,
	) -> Result<ReserveUsernameResponse> {
		let uid = Self::require_caller(caller)?;

		let username = normalize_username(requested);
		validate_username(&username).map_err(AccountsServerError::InvalidUsername)?;

		self.repo.reserve_username(uid, &username, Utc::now()).await?;

		tracing::debug!(uid = %uid, "username reserved");
		Ok(ReserveUsernameResponse { ok: true, username })
	}

	/// Promote the caller's `is_verified` flag once the identity provider
	/// confirms the email.
	///
	/// Returns the soft `NOT_VERIFIED` outcome (not an error) while the
	/// provider still reports the email unverified; callers poll again
	/// later. Only the caller's own profile can ever be promoted.
	#[instrument(skip(self, caller))]
	pub async fn mark_verified(
		&self,
		caller: Option<&AccountId>,
	) -> Result<MarkVerifiedResponse> {
		let uid = Self::require_caller(caller)?;

		let user = self.provider.get_user(uid).await?;
		if !user.email_verified {
			return Ok(MarkVerifiedResponse::not_verified());
		}

		self.repo.set_verified(uid, Utc::now()).await?;

		tracing::debug!(uid = %uid, "profile marked verified");
		Ok(MarkVerifiedResponse::verified())
	}

	/// Materialize a profile for a freshly created identity.
	///
	/// Events without a uid are ignored. Write failures propagate without
	/// internal retry: the event-delivery layer re-runs the handler, which
	/// is safe because the profile write merges.
	#[instrument(skip(self, event))]
	pub async fn on_identity_created(&self, event: &IdentityCreatedEvent) -> Result<()> {
		let Some(uid) = event.uid() else {
			tracing::warn!("identity-created event without uid, ignoring");
			return Ok(());
		};

		let email = event
			.email
			.as_deref()
			.map(|e| e.trim().to_lowercase())
			.filter(|e| !e.is_empty());

		let is_admin = match email.as_deref() {
			Some(email) => self.repo.is_admin_email(email).await?,
			None => false,
		};

		let profile = NewProfile::for_created_identity(
			AccountId::new(uid),
			email,
			event.email_verified,
			is_admin,
		);
		self.repo.create_profile(&profile, Utc::now()).await?;

		tracing::info!(uid = %profile.uid, role = %profile.role, "user profile provisioned");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use chrono::{DateTime, Utc};
	use std::sync::atomic::{AtomicUsize, Ordering};

	use roost_accounts_core::{Role, UserProfile, UsernameReservation};
	use roost_server_db::{testing::create_test_pool, DbError, SqliteAccountRepository};

	use crate::provider::StaticIdentityProvider;

	/// Counts every store access so tests can assert fail-fast paths never
	/// touch the database.
	struct CountingRepo {
		inner: SqliteAccountRepository,
		accesses: AtomicUsize,
	}

	impl CountingRepo {
		fn new(inner: SqliteAccountRepository) -> Self {
			Self {
				inner,
				accesses: AtomicUsize::new(0),
			}
		}

		fn access_count(&self) -> usize {
			self.accesses.load(Ordering::SeqCst)
		}

		fn touch(&self) {
			self.accesses.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[async_trait]
	impl AccountRepository for CountingRepo {
		async fn create_profile(
			&self,
			profile: &NewProfile,
			now: DateTime<Utc>,
		) -> std::result::Result<(), DbError> {
			self.touch();
			self.inner.create_profile(profile, now).await
		}

		async fn get_profile(
			&self,
			uid: &AccountId,
		) -> std::result::Result<Option<UserProfile>, DbError> {
			self.touch();
			self.inner.get_profile(uid).await
		}

		async fn reserve_username(
			&self,
			uid: &AccountId,
			username: &str,
			now: DateTime<Utc>,
		) -> std::result::Result<(), DbError> {
			self.touch();
			self.inner.reserve_username(uid, username, now).await
		}

		async fn get_reservation(
			&self,
			username: &str,
		) -> std::result::Result<Option<UsernameReservation>, DbError> {
			self.touch();
			self.inner.get_reservation(username).await
		}

		async fn set_verified(
			&self,
			uid: &AccountId,
			now: DateTime<Utc>,
		) -> std::result::Result<(), DbError> {
			self.touch();
			self.inner.set_verified(uid, now).await
		}

		async fn is_admin_email(&self, email: &str) -> std::result::Result<bool, DbError> {
			self.touch();
			self.inner.is_admin_email(email).await
		}

		async fn add_admin_email(&self, email: &str) -> std::result::Result<(), DbError> {
			self.touch();
			self.inner.add_admin_email(email).await
		}
	}

	struct Harness {
		service: AccountsService,
		repo: Arc<CountingRepo>,
		raw: SqliteAccountRepository,
		provider: Arc<StaticIdentityProvider>,
	}

	async fn make_harness() -> Harness {
		let pool = create_test_pool().await;
		let raw = SqliteAccountRepository::new(pool);
		let repo = Arc::new(CountingRepo::new(raw.clone()));
		let provider = Arc::new(StaticIdentityProvider::new());
		let service = AccountsService::new(repo.clone(), provider.clone());
		Harness {
			service,
			repo,
			raw,
			provider,
		}
	}

	fn event(uid: &str, email: Option<&str>, verified: bool) -> IdentityCreatedEvent {
		IdentityCreatedEvent {
			uid: Some(uid.to_string()),
			email: email.map(str::to_string),
			email_verified: verified,
		}
	}

	mod reserve_username {
		use super::*;

		#[tokio::test]
		async fn unauthenticated_never_touches_store() {
			let h = make_harness().await;

			let err = h.service.reserve_username(None, "alice").await.unwrap_err();
			assert!(matches!(err, AccountsServerError::Unauthenticated));

			let empty = AccountId::new("");
			let err = h
				.service
				.reserve_username(Some(&empty), "alice")
				.await
				.unwrap_err();
			assert!(matches!(err, AccountsServerError::Unauthenticated));

			assert_eq!(h.repo.access_count(), 0);
		}

		#[tokio::test]
		async fn invalid_names_rejected_before_store() {
			let h = make_harness().await;
			let uid = AccountId::new("u1");

			let too_long = "a".repeat(25);
			for bad in ["ab", too_long.as_str(), "Has Space", "emoji🙂"] {
				let err = h
					.service
					.reserve_username(Some(&uid), bad)
					.await
					.unwrap_err();
				assert!(
					matches!(err, AccountsServerError::InvalidUsername(_)),
					"expected InvalidUsername for {bad:?}"
				);
			}

			assert_eq!(h.repo.access_count(), 0);
		}

		#[tokio::test]
		async fn reserves_normalized_name() {
			let h = make_harness().await;
			let uid = AccountId::new("u1");

			let resp = h
				.service
				.reserve_username(Some(&uid), "  Alice123 ")
				.await
				.unwrap();
			assert!(resp.ok);
			assert_eq!(resp.username, "alice123");

			let reservation = h.raw.get_reservation("alice123").await.unwrap().unwrap();
			assert_eq!(reservation.uid, uid);
			let profile = h.raw.get_profile(&uid).await.unwrap().unwrap();
			assert_eq!(profile.username.as_deref(), Some("alice123"));
		}

		#[tokio::test]
		async fn reclaim_under_different_casing_is_idempotent() {
			let h = make_harness().await;
			let uid = AccountId::new("u1");

			h.service
				.reserve_username(Some(&uid), "Alice123")
				.await
				.unwrap();
			let resp = h
				.service
				.reserve_username(Some(&uid), "ALICE123")
				.await
				.unwrap();
			assert_eq!(resp.username, "alice123");

			let reservation = h.raw.get_reservation("alice123").await.unwrap().unwrap();
			assert_eq!(reservation.uid, uid);
		}

		#[tokio::test]
		async fn case_folded_collision_is_taken() {
			let h = make_harness().await;
			let first = AccountId::new("u1");
			let second = AccountId::new("u2");

			h.service
				.reserve_username(Some(&first), "Alice123")
				.await
				.unwrap();

			let err = h
				.service
				.reserve_username(Some(&second), "alice123")
				.await
				.unwrap_err();
			assert!(matches!(err, AccountsServerError::UsernameTaken));

			let reservation = h.raw.get_reservation("alice123").await.unwrap().unwrap();
			assert_eq!(reservation.uid, first);
		}
	}

	mod mark_verified {
		use super::*;

		#[tokio::test]
		async fn unauthenticated_never_touches_store() {
			let h = make_harness().await;

			let err = h.service.mark_verified(None).await.unwrap_err();
			assert!(matches!(err, AccountsServerError::Unauthenticated));
			assert_eq!(h.repo.access_count(), 0);
		}

		#[tokio::test]
		async fn soft_failure_until_provider_confirms() {
			let h = make_harness().await;
			let uid = AccountId::new("u1");

			h.service
				.on_identity_created(&event("u1", Some("ann@example.com"), false))
				.await
				.unwrap();
			h.provider.put_user(&uid, false);

			let resp = h.service.mark_verified(Some(&uid)).await.unwrap();
			assert!(!resp.ok);
			assert_eq!(resp.reason.as_deref(), Some("NOT_VERIFIED"));

			let profile = h.raw.get_profile(&uid).await.unwrap().unwrap();
			assert!(!profile.is_verified);

			// Provider flips; the next call promotes the flag.
			h.provider.put_user(&uid, true);
			let resp = h.service.mark_verified(Some(&uid)).await.unwrap();
			assert!(resp.ok);
			assert_eq!(resp.reason, None);

			let profile = h.raw.get_profile(&uid).await.unwrap().unwrap();
			assert!(profile.is_verified);
		}

		#[tokio::test]
		async fn response_serializes_like_the_wire_contract() {
			let ok = serde_json::to_string(&MarkVerifiedResponse::verified()).unwrap();
			assert_eq!(ok, r#"{"ok":true}"#);

			let soft = serde_json::to_string(&MarkVerifiedResponse::not_verified()).unwrap();
			assert_eq!(soft, r#"{"ok":false,"reason":"NOT_VERIFIED"}"#);
		}
	}

	mod on_identity_created {
		use super::*;

		#[tokio::test]
		async fn event_without_uid_is_a_no_op() {
			let h = make_harness().await;

			h.service
				.on_identity_created(&IdentityCreatedEvent::default())
				.await
				.unwrap();
			h.service
				.on_identity_created(&IdentityCreatedEvent {
					uid: Some(String::new()),
					email: Some("ann@example.com".to_string()),
					email_verified: true,
				})
				.await
				.unwrap();

			assert_eq!(h.repo.access_count(), 0);
		}

		#[tokio::test]
		async fn allowlisted_email_provisions_admin() {
			let h = make_harness().await;
			h.raw.add_admin_email("bob@example.com").await.unwrap();

			h.service
				.on_identity_created(&event("u1", Some("Bob@Example.com"), true))
				.await
				.unwrap();

			let profile = h
				.raw
				.get_profile(&AccountId::new("u1"))
				.await
				.unwrap()
				.unwrap();
			assert_eq!(profile.role, Role::Admin);
			assert!(profile.is_verified);
			assert_eq!(profile.email.as_deref(), Some("bob@example.com"));
			assert_eq!(profile.username.as_deref(), Some("bob"));
			assert_eq!(profile.wallet, None);
			assert_eq!(profile.completed_task, None);
			assert_eq!(profile.user_level_id, None);
		}

		#[tokio::test]
		async fn unlisted_email_provisions_regular() {
			let h = make_harness().await;

			h.service
				.on_identity_created(&event("u2", Some("Carol@Example.com"), false))
				.await
				.unwrap();

			let profile = h
				.raw
				.get_profile(&AccountId::new("u2"))
				.await
				.unwrap()
				.unwrap();
			assert_eq!(profile.role, Role::Regular);
			assert!(!profile.is_verified);
			assert_eq!(profile.username.as_deref(), Some("carol"));
			assert_eq!(profile.wallet, Some(0));
			assert_eq!(profile.completed_task, Some(0));
			assert_eq!(profile.user_level_id.as_deref(), Some("beginner"));
		}

		#[tokio::test]
		async fn missing_email_skips_allowlist_lookup() {
			let h = make_harness().await;

			h.service
				.on_identity_created(&event("u3", None, false))
				.await
				.unwrap();

			// One create_profile, no is_admin_email.
			assert_eq!(h.repo.access_count(), 1);

			let profile = h
				.raw
				.get_profile(&AccountId::new("u3"))
				.await
				.unwrap()
				.unwrap();
			assert_eq!(profile.role, Role::Regular);
			assert_eq!(profile.email, None);
			assert_eq!(profile.username, None);
		}
	}
}
