use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account as returned by the API.
///
/// The password hash is deliberately absent from this type: it can never be
/// serialized to a client because it is never loaded into it. Login reads
/// the hash through `UserCredentials` instead.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Login-time projection carrying the stored bcrypt hash.
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
