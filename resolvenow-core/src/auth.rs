//! Sign-up and login.
//!
//! Credentials are stored as `sha256:` followed by 64 lower-case hex digits.
//! Any other stored value, including one that merely starts with `sha256:`, is
//! a plaintext password carried over from an imported snapshot and is compared
//! verbatim. A plaintext password that itself has the digest shape cannot be
//! told apart from a digest.

use sha2::{Digest, Sha256};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::types::{Account, CurrentUser, NewAccount, Role};

const HASH_PREFIX: &str = "sha256:";

/// Hash a plaintext password into its stored form.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{}{}", HASH_PREFIX, hex::encode(digest))
}

/// Check a plaintext password against a stored credential.
pub fn verify_password(stored: &str, password: &str) -> bool {
    match stored.strip_prefix(HASH_PREFIX).filter(|digest| is_digest(digest)) {
        Some(expected) => hex::encode(Sha256::digest(password.as_bytes())) == expected,
        None => stored == password,
    }
}

fn is_digest(digest: &str) -> bool {
    digest.len() == 64 && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Register a new account.
///
/// Fails with `DuplicateEmail` if the email is already registered under any role.
pub fn sign_up(db: &Database, new_account: NewAccount) -> Result<()> {
    let account = Account {
        name: new_account.name,
        email: new_account.email,
        password: hash_password(&new_account.password),
        mobile: new_account.mobile,
        role: new_account.role,
    };
    db.register_account(account)
}

/// Log in with email, password and the role picked on the form.
///
/// `AccountNotFound` when no account has both this email and role,
/// `InvalidPassword` when the password does not match.
pub fn login(db: &Database, email: &str, password: &str, role: Role) -> Result<CurrentUser> {
    let account = db.find_account(email, role)?.ok_or(Error::AccountNotFound)?;

    if !verify_password(&account.password, password) {
        tracing::info!(email, role = %role, "Login rejected: wrong password");
        return Err(Error::InvalidPassword);
    }

    tracing::info!(email, role = %role, "Login successful");
    Ok(CurrentUser::from(&account))
}
