//! Password hashing and the default-credential rule
//!
//! Hashing is bcrypt with a configurable cost. The default password for new
//! and reset accounts is derived from the first name and employee number.
//! That derivation is guessable and is kept only because it is the
//! documented legacy contract; the `must_change_password` flag forces a
//! rotation on first login.

use crate::error::AppResult;

/// Hash a plaintext password with the given bcrypt cost.
pub fn hash_password(plain: &str, cost: u32) -> AppResult<String> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Verify a plaintext password against a stored hash. Any bcrypt failure
/// (malformed hash included) counts as a mismatch.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or(false)
}

/// Deterministic default credential: first name concatenated with the
/// employee number.
pub fn default_password(first_name: &str, employee_number: &str) -> String {
    format!("{}{}", first_name, employee_number)
}
