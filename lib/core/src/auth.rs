//! Session primitives: roles, JWT claims, and the shared-password scheme.
//!
//! Two roles share the service: `admin` (fixed secret, stored as an
//! argon2id hash in the server config) and `user` (daily password derived
//! from the local calendar date). Sessions are stateless JWTs with an
//! absolute expiry.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::ServiceError;
use crate::types::new_id;

/// Session role. Admins manage uploads, history and resets; users only
/// pull codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject. The password scheme has no usernames, so this is the
    /// role name.
    pub sub: String,
    /// Session role.
    pub role: Role,
    /// Session id. Keys the per-session issuance slot.
    pub sid: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Issue a signed session token for the given role.
pub fn issue_token(role: Role, secret: &str, expire_secs: u64) -> Result<(String, Claims), ServiceError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: role.as_str().to_string(),
        role,
        sid: new_id(),
        iat: now,
        exp: now + expire_secs as i64,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    let token = encode(&Header::default(), &claims, &key)
        .map_err(|e| ServiceError::Internal(format!("failed to encode token: {}", e)))?;
    Ok((token, claims))
}

/// Validate a session token and return its claims. Expired or malformed
/// tokens are an authentication failure, never a panic.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ServiceError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))
}

/// Gate for admin-only operations.
pub fn require_admin(claims: &Claims) -> Result<(), ServiceError> {
    if claims.role != Role::Admin {
        return Err(ServiceError::PermissionDenied("admin session required".into()));
    }
    Ok(())
}

/// The user password for a given date: two-digit day, lowercase month
/// abbreviation, four-digit year (`16feb2026`). Rotates at local midnight.
pub fn daily_password(date: chrono::NaiveDate) -> String {
    date.format("%d%b%Y").to_string().to_lowercase()
}

/// Today's user password, in local time.
pub fn today_password() -> String {
    daily_password(chrono::Local::now().date_naive())
}

/// Check a login attempt against the daily user password. Input is
/// trimmed and lowercased first, so `16FEB2026 ` still logs in.
pub fn verify_user_password(input: &str) -> bool {
    input.trim().to_lowercase() == today_password()
}

/// Verify an admin login attempt against the stored argon2id hash.
pub fn verify_admin_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::PasswordHash;
    use password_hash::PasswordVerifier;

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hash(password: &str) -> String {
        use argon2::Argon2;
        use password_hash::{PasswordHasher, SaltString};

        let salt = SaltString::from_b64("c29tZXNhbHRzdHJpbmc").unwrap();
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn daily_password_format() {
        let d = chrono::NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
        assert_eq!(daily_password(d), "16feb2026");

        let d = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(daily_password(d), "01jan2025");

        let d = chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(daily_password(d), "31dec2024");
    }

    #[test]
    fn user_password_is_case_and_space_insensitive() {
        let today = today_password();
        assert!(verify_user_password(&today));
        assert!(verify_user_password(&format!("  {}  ", today.to_uppercase())));
        assert!(!verify_user_password("25dec1999"));
    }

    #[test]
    fn token_roundtrip() {
        let (token, claims) = issue_token(Role::Admin, "secret", 3600).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.sid.len(), 32);

        let decoded = verify_token(&token, "secret").unwrap();
        assert_eq!(decoded.role, Role::Admin);
        assert_eq!(decoded.sid, claims.sid);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let (token, _) = issue_token(Role::User, "secret", 3600).unwrap();
        assert!(verify_token(&token, "other").is_err());
        assert!(verify_token("garbage", "secret").is_err());
    }

    #[test]
    fn token_rejects_expired() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "user".into(),
            role: Role::User,
            sid: new_id(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let key = EncodingKey::from_secret(b"secret");
        let token = encode(&Header::default(), &claims, &key).unwrap();
        assert!(verify_token(&token, "secret").is_err());
    }

    #[test]
    fn require_admin_gates_users() {
        let (_, admin) = issue_token(Role::Admin, "s", 60).unwrap();
        let (_, user) = issue_token(Role::User, "s", 60).unwrap();
        assert!(require_admin(&admin).is_ok());
        assert!(require_admin(&user).is_err());
    }

    #[test]
    fn admin_password_verify() {
        let hash = test_hash("Tond#1100");
        assert!(verify_admin_password("Tond#1100", &hash));
        assert!(!verify_admin_password("wrong", &hash));
        assert!(!verify_admin_password("Tond#1100", "not-a-hash"));
    }
}
