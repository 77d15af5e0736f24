//! Session tokens
//!
//! Signed HS256 tokens with a fixed validity window (24 hours by default).
//! Claims carry the employee id, permission level and manager link so the
//! actor snapshot can be rebuilt without trusting the caller.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::employee;
use crate::error::AppResult;

/// Token claims for an authenticated employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Employee id
    pub sub: Uuid,
    /// Permission level at issue time
    pub level: String,
    /// Manager link at issue time
    pub manager_id: Option<Uuid>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiry (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn for_employee(record: &employee::Model, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: record.id,
            level: record.permission_level.clone(),
            manager_id: record.manager_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
        }
    }
}

/// Sign claims into a token string.
pub fn issue(claims: &Claims, secret: &str) -> AppResult<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify a token and return its claims. Expired or tampered tokens surface
/// as a generic authentication failure.
pub fn verify(token: &str, secret: &str) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record() -> employee::Model {
        employee::Model {
            id: Uuid::new_v4(),
            employee_number: "EMP001".into(),
            first_name: "Ada".into(),
            surname: "Lovelace".into(),
            email: "ada@example.com".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            salary: Decimal::new(50_000, 0),
            role: "Engineer".into(),
            permission_level: "manager".into(),
            manager_id: None,
            is_active: true,
            password: String::new(),
            must_change_password: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let rec = record();
        let claims = Claims::for_employee(&rec, 24);
        let token = issue(&claims, "test-secret").unwrap();

        let decoded = verify(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, rec.id);
        assert_eq!(decoded.level, "manager");
        assert!(decoded.exp > decoded.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::for_employee(&record(), 24);
        let token = issue(&claims, "test-secret").unwrap();

        let result = verify(&token, "other-secret");
        assert!(matches!(result, Err(AppError::AuthenticationFailure)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let rec = record();
        let now = Utc::now();
        let claims = Claims {
            sub: rec.id,
            level: rec.permission_level.clone(),
            manager_id: None,
            iat: (now - Duration::hours(48)).timestamp(),
            exp: (now - Duration::hours(24)).timestamp(),
        };
        let token = issue(&claims, "test-secret").unwrap();

        let result = verify(&token, "test-secret");
        assert!(matches!(result, Err(AppError::AuthenticationFailure)));
    }
}
