pub mod extractors;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export the pieces handlers and tests actually reach for.
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use rate_limit::{RateLimit, RateLimiter};
pub use token::{generate_token, verify_token, Claims};

/// Payload for `POST /api/auth/login`.
///
/// Fields default to empty strings so a missing field surfaces as a
/// field-level validation error instead of a deserialization failure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Payload for `POST /api/auth/register`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// The public identity slice included in auth responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub name: String,
}

/// Response body for successful registration and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: AuthUser,
}
