// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account services for Roost.
//!
//! Three independent, stateless operations over the shared account store:
//!
//! - [`AccountsService::on_identity_created`] - materializes a profile when
//!   the identity provider reports a new account, assigning `admin` or
//!   `regular` from the allow-list
//! - [`AccountsService::reserve_username`] - claims a globally-unique
//!   username through the store's atomic reservation transaction
//! - [`AccountsService::mark_verified`] - promotes the caller's
//!   verification flag once the provider confirms it
//!
//! Transport plumbing and token verification live elsewhere; callers hand
//! these services an already-resolved identity (or `None` when the request
//! was unauthenticated).

pub mod error;
pub mod provider;
pub mod service;

pub use error::{AccountsServerError, Result};
pub use provider::{IdentityProvider, ProviderUser, StaticIdentityProvider};
pub use service::{AccountsService, MarkVerifiedResponse, ReserveUsernameResponse};
