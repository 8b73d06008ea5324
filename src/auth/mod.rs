// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session tokens, the authorization gate and login credential checks.
//!
//! ## Auth Flow
//!
//! 1. Client posts email and password to `POST /api/auth/create`
//! 2. [`CredentialVerifier`] checks them against the stored Argon2 hash
//! 3. The server signs `{ id }` with HS256 into a short-lived session token
//! 4. Client sends `Authorization: Bearer <token>` on every other request
//! 5. [`authorize`] decodes it and attaches an [`AuthenticatedUser`]
//!
//! ## Security
//!
//! - Every `/api` path outside the allow-list requires a session
//! - Only HS256 is accepted; `alg: none` and other algorithms are rejected
//! - Expiry is checked with no leeway
//! - Login failures never reveal whether the email exists

pub mod claims;
pub mod credentials;
pub mod gate;
pub mod session;
pub mod token;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use credentials::{
    run_blocking, Argon2Passwords, CredentialVerifier, PasswordVerifier, UserLookup,
};
pub use gate::{authorize, AuthGate, GateDecision};
pub use session::Auth;
pub use token::{
    token_from_authorization_header, TimeToLive, TokenCodec, TokenError, VerifiedToken,
};
