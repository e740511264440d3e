// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the accounts core.

use thiserror::Error;

/// Errors that can occur in the accounts domain types.
#[derive(Debug, Error)]
pub enum AccountsError {
	/// Invalid role string
	#[error("invalid role: {0}")]
	InvalidRole(String),
}
