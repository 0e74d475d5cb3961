use std::env;

/// Application configuration, loaded once at startup from the environment.
///
/// `DATABASE_URL` and `JWT_SECRET` are mandatory: the process must not start
/// without them, so `from_env` panics with a clear message if either is
/// missing. Everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub cors_origin: String,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
}

/// Token-signing parameters shared with the auth module via app data.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
}

/// Fixed-window rate limit applied to the authentication routes.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
                jwt_expiry_days: env::var("JWT_EXPIRY_DAYS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse()
                    .expect("JWT_EXPIRY_DAYS must be a number"),
            },
            rate_limit: RateLimitConfig {
                max_attempts: env::var("AUTH_RATE_LIMIT_MAX")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("AUTH_RATE_LIMIT_MAX must be a number"),
                window_secs: env::var("AUTH_RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or_else(|_| "900".to_string())
                    .parse()
                    .expect("AUTH_RATE_LIMIT_WINDOW_SECS must be a number"),
            },
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
