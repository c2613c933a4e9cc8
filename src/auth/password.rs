//! Password hashing

use crate::error::Result;

/// bcrypt work factor. Changing it only affects newly created hashes.
pub const HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash a password with a fresh salt.
///
/// Passwords bcrypt would truncate are refused with `BcryptError::Truncation`.
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::non_truncating_hash(password, HASH_COST)?)
}

/// Check a candidate password against a stored hash.
///
/// A malformed hash or an over-long candidate is a mismatch, not an error.
pub fn verify_password(hash: &str, candidate: &str) -> bool {
    match bcrypt::non_truncating_verify(candidate, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::debug!("Stored password hash could not be checked: {}", e);
            false
        }
    }
}
