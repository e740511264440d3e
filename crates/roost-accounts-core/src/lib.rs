// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Roost account provisioning system.
//!
//! This crate provides the shared domain types used by the server-side
//! account services (`roost-server-accounts`) and the storage layer
//! (`roost-server-db`):
//!
//! - [`AccountId`] - opaque provider-issued caller identity
//! - [`Role`] - `admin`/`regular` split driven by the admin allow-list
//! - [`UserProfile`] / [`NewProfile`] - the per-user profile record
//! - [`UsernameReservation`] - the name → owner binding
//! - [`IdentityCreatedEvent`] - the provider's account-creation payload
//! - [`validate_username`] / [`normalize_username`] - the username namespace
//!   rules (`^[a-z0-9._-]{3,24}$`, case-folded)

pub mod error;
pub mod event;
pub mod profile;
pub mod reservation;
pub mod types;
pub mod username;

pub use error::AccountsError;
pub use event::IdentityCreatedEvent;
pub use profile::{NewProfile, UserProfile, DEFAULT_USER_LEVEL};
pub use reservation::UsernameReservation;
pub use types::{AccountId, Role};
pub use username::{
	normalize_username, validate_username, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};
