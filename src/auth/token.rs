use crate::config::AuthConfig;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: i32,
    /// Email at issuance time. Informational; the auth gate re-resolves the
    /// user from the database on every request.
    pub email: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signs a compact claim set for the given user.
///
/// Expiry defaults to 7 days and is configurable through
/// [`AuthConfig::jwt_expiry_days`]. The signing secret is held by the server
/// and loaded at startup; there is no env lookup at call time.
pub fn generate_token(user_id: i32, email: &str, config: &AuthConfig) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(config.jwt_expiry_days))
        .ok_or_else(|| AppError::Internal("Token expiry overflowed".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies a token and decodes its claims.
///
/// Expired and malformed tokens are logged distinctly but both come back as
/// the same generic 401; clients never learn which case they hit.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => log::info!("rejected expired token"),
            _ => log::warn!("rejected malformed token: {}", e),
        }
        AppError::Unauthorized("Invalid or expired token".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            jwt_expiry_days: 7,
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        let config = test_config("test_secret_for_gen_verify");
        let token = generate_token(42, "user@example.com", &config).unwrap();
        let claims = verify_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn test_token_expiration() {
        let secret = "test_secret_for_expiration";
        let expiration = chrono::Utc::now()
            .checked_sub_signed(chrono::Duration::hours(2))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims_expired = Claims {
            sub: 2,
            email: "expired@example.com".to_string(),
            exp: expiration,
        };
        let expired_token = encode(
            &Header::default(),
            &claims_expired,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        match verify_token(&expired_token, secret) {
            Err(AppError::Unauthorized(msg)) => {
                // Same generic message as any other token failure.
                assert_eq!(msg, "Invalid or expired token");
            }
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let config = test_config("issuer_secret");
        let token = generate_token(7, "user@example.com", &config).unwrap();

        match verify_token(&token, "a_completely_different_secret") {
            Err(AppError::Unauthorized(msg)) => {
                assert_eq!(msg, "Invalid or expired token");
            }
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            verify_token("not-a-jwt", "secret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expiry_honors_config() {
        let config = AuthConfig {
            jwt_secret: "expiry_config_secret".to_string(),
            jwt_expiry_days: 1,
        };
        let token = generate_token(1, "a@b.co", &config).unwrap();
        let claims = verify_token(&token, &config.jwt_secret).unwrap();

        let now = chrono::Utc::now().timestamp() as usize;
        let one_day = 24 * 60 * 60;
        assert!(claims.exp > now);
        assert!(claims.exp <= now + one_day + 60);
    }
}
