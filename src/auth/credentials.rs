// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login credential verification.
//!
//! The verifier only sees two capabilities: a way to find a user by email
//! and a way to compare a plaintext password with a stored hash. Every
//! failure on the login path collapses into `InvalidLoginError`, so callers
//! cannot tell an unknown email from a wrong password.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Argon2,
};

use crate::{
    error::ApiError,
    storage::{PublicUser, StorageResult, StoredUser, UserRepository},
};

/// Identity lookup used by the login flow.
pub trait UserLookup {
    fn find_by_email(&self, email: &str) -> StorageResult<StoredUser>;
}

impl UserLookup for UserRepository<'_> {
    fn find_by_email(&self, email: &str) -> StorageResult<StoredUser> {
        UserRepository::find_by_email(self, email)
    }
}

/// Argon2id PHC string with the same parameters as freshly hashed passwords.
/// Matches no password. Verified against when the email is unknown so both
/// login failures cost one full Argon2 run.
pub const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$WKM/8c9BDr3kcrspkirxrVgTcN6cHM4/px1javWj9Ng";

/// Run password hashing or verification on the blocking pool so the async
/// workers keep serving other requests.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(ApiError::internal)?
}

/// Compares a plaintext secret against a stored opaque hash.
pub trait PasswordVerifier {
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id password hashing with the crate's default parameters.
#[derive(Default, Clone)]
pub struct Argon2Passwords {
    argon2: Argon2<'static>,
}

impl Argon2Passwords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `plaintext` into a PHC string with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
    }
}

impl PasswordVerifier for Argon2Passwords {
    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        // Unparseable hashes simply never match.
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

pub struct CredentialVerifier<'a, L, P> {
    users: L,
    passwords: &'a P,
}

impl<'a, L, P> CredentialVerifier<'a, L, P>
where
    L: UserLookup,
    P: PasswordVerifier,
{
    pub fn new(users: L, passwords: &'a P) -> Self {
        Self { users, passwords }
    }

    /// Check `email`/`password` and return the user's public projection.
    pub fn verify_login(&self, email: &str, password: &str) -> Result<PublicUser, ApiError> {
        let user = match self.users.find_by_email(email) {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(error = %e, "login lookup failed");
                self.passwords.verify(password, DUMMY_HASH);
                return Err(ApiError::invalid_login());
            }
        };

        if self.passwords.verify(password, &user.password_hash) {
            Ok(PublicUser::from(user))
        } else {
            tracing::debug!(user_id = %user.id, "login password mismatch");
            Err(ApiError::invalid_login())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{repository::users::tests::sample_user, StorageError};
    use std::{
        cell::RefCell,
        time::{Duration, Instant},
    };

    struct FakeUsers(Option<StoredUser>);

    impl UserLookup for FakeUsers {
        fn find_by_email(&self, email: &str) -> StorageResult<StoredUser> {
            match &self.0 {
                Some(user) if user.email == email => Ok(user.clone()),
                Some(_) | None => Err(StorageError::NotFound("User".to_string())),
            }
        }
    }

    struct BrokenUsers;

    impl UserLookup for BrokenUsers {
        fn find_by_email(&self, _email: &str) -> StorageResult<StoredUser> {
            Err(StorageError::NotInitialized)
        }
    }

    fn user_with_password(passwords: &Argon2Passwords, password: &str) -> StoredUser {
        let mut user = sample_user("ada", "ada@example.com");
        user.password_hash = passwords.hash(password).unwrap();
        user
    }

    #[test]
    fn hash_then_verify() {
        let passwords = Argon2Passwords::new();
        let hash = passwords.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(passwords.verify("correct horse", &hash));
        assert!(!passwords.verify("wrong horse", &hash));
        assert!(!passwords.verify("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn correct_credentials_return_public_user() {
        let passwords = Argon2Passwords::new();
        let user = user_with_password(&passwords, "s3cret-pass");
        let verifier = CredentialVerifier::new(FakeUsers(Some(user.clone())), &passwords);

        let public = verifier.verify_login("ada@example.com", "s3cret-pass").unwrap();
        assert_eq!(public, PublicUser::from(&user));
    }

    #[test]
    fn unknown_email_and_wrong_password_are_indistinguishable() {
        let passwords = Argon2Passwords::new();
        let user = user_with_password(&passwords, "s3cret-pass");
        let verifier = CredentialVerifier::new(FakeUsers(Some(user)), &passwords);

        let wrong_password = verifier
            .verify_login("ada@example.com", "nope")
            .unwrap_err();
        let unknown_email = verifier
            .verify_login("bob@example.com", "s3cret-pass")
            .unwrap_err();

        assert_eq!(wrong_password.name(), "InvalidLoginError");
        assert_eq!(unknown_email.name(), "InvalidLoginError");
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[test]
    fn lookup_failures_collapse_to_invalid_login() {
        let passwords = Argon2Passwords::new();
        let verifier = CredentialVerifier::new(BrokenUsers, &passwords);

        let err = verifier.verify_login("ada@example.com", "x").unwrap_err();
        assert!(matches!(err, ApiError::InvalidLogin(_)));
    }

    /// Records every hash it is asked to check.
    #[derive(Default)]
    struct CountingPasswords {
        checked: RefCell<Vec<String>>,
    }

    impl CountingPasswords {
        fn checked(&self) -> Vec<String> {
            self.checked.borrow().clone()
        }
    }

    impl PasswordVerifier for CountingPasswords {
        fn verify(&self, _plaintext: &str, hash: &str) -> bool {
            self.checked.borrow_mut().push(hash.to_string());
            false
        }
    }

    #[test]
    fn every_failed_login_runs_one_password_check() {
        let mut user = sample_user("ada", "ada@example.com");
        user.password_hash = "$argon2id$stored".to_string();

        let passwords = CountingPasswords::default();
        let verifier = CredentialVerifier::new(FakeUsers(Some(user)), &passwords);
        verifier.verify_login("ada@example.com", "nope").unwrap_err();
        verifier.verify_login("bob@example.com", "nope").unwrap_err();
        assert_eq!(passwords.checked(), vec!["$argon2id$stored", DUMMY_HASH]);

        let passwords = CountingPasswords::default();
        CredentialVerifier::new(BrokenUsers, &passwords)
            .verify_login("ada@example.com", "nope")
            .unwrap_err();
        assert_eq!(passwords.checked(), vec![DUMMY_HASH]);
    }

    #[test]
    fn dummy_hash_matches_fresh_hash_parameters() {
        let passwords = Argon2Passwords::new();
        let fresh = passwords.hash("anything").unwrap();
        let params = |hash: &str| hash.rsplitn(3, '$').nth(2).map(str::to_string);

        assert!(PasswordHash::new(DUMMY_HASH).is_ok());
        assert_eq!(params(DUMMY_HASH), params(&fresh));
        assert!(!passwords.verify("", DUMMY_HASH));
        assert!(!passwords.verify("anything", DUMMY_HASH));
    }

    #[tokio::test]
    async fn blocking_work_leaves_the_runtime_free() {
        let started = Instant::now();
        let ticker = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            started.elapsed()
        });

        let value = run_blocking(|| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(7)
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert!(ticker.await.unwrap() < Duration::from_millis(300));
    }
}
