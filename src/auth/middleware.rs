use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::extractors::CurrentUser;
use crate::auth::token::verify_token;
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::User;

/// The authorization gate for protected routes.
///
/// Per request: no `Authorization` header or a non-Bearer header rejects
/// with 401; a Bearer token is verified; valid claims are resolved to a
/// live user row; the resulting [`CurrentUser`] identity is attached to
/// request extensions for handlers to extract. The gate reads but never
/// mutates user or token state.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        // Rejections become responses here rather than propagating as
        // service errors, so the envelope renders the same in tests and
        // in production.
        fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
            req.into_response(err.error_response().map_into_right_body())
        }

        Box::pin(async move {
            let bearer = req
                .headers()
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned);

            let token = match bearer {
                Some(token) if !token.is_empty() => token,
                _ => {
                    let err = AppError::Unauthorized(
                        "No token provided. Authorization header must start with \"Bearer \""
                            .into(),
                    );
                    return Ok(reject(req, err));
                }
            };

            let auth_config = match req.app_data::<web::Data<AuthConfig>>() {
                Some(config) => config.clone(),
                None => {
                    let err = AppError::Internal("Auth config not registered".into());
                    return Ok(reject(req, err));
                }
            };
            let pool = match req.app_data::<web::Data<PgPool>>() {
                Some(pool) => pool.clone(),
                None => {
                    let err = AppError::Internal("Database pool not registered".into());
                    return Ok(reject(req, err));
                }
            };

            let claims = match verify_token(&token, &auth_config.jwt_secret) {
                Ok(claims) => claims,
                Err(err) => return Ok(reject(req, err)),
            };

            // The token alone is not enough: the subject must still exist.
            let user = match sqlx::query_as::<_, User>(
                "SELECT id, name, email, created_at FROM users WHERE id = $1",
            )
            .bind(claims.sub)
            .fetch_optional(pool.get_ref())
            .await
            {
                Ok(user) => user,
                Err(err) => return Ok(reject(req, AppError::from(err))),
            };

            match user {
                Some(user) => {
                    req.extensions_mut().insert(CurrentUser {
                        id: user.id,
                        email: user.email,
                        name: user.name,
                    });
                    service
                        .call(req)
                        .await
                        .map(|res| res.map_into_left_body())
                }
                None => {
                    log::warn!("token for nonexistent user id {}", claims.sub);
                    Ok(reject(req, AppError::Unauthorized("User not found".into())))
                }
            }
        })
    }
}
