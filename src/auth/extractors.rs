use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The authenticated identity attached to a request by `AuthMiddleware`.
///
/// Handlers take this as an extractor argument; if it is missing from
/// request extensions (middleware not applied, or applied incorrectly) the
/// extraction fails with 401 rather than letting an unscoped request
/// through to the repository.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub name: String,
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CurrentUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized(
                    "Authentication required".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
