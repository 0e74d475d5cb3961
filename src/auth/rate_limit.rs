use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Fixed-window request counter keyed by client IP.
///
/// Shared across workers via `web::Data`. A window starts on the first
/// request from a client and counts attempts until it elapses; the count
/// then resets. This protects the authentication routes from credential
/// stuffing and is deliberately simple: no sliding window, no distributed
/// state.
pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    hits: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_secs(config.window_secs))
    }

    /// Records one attempt for `key` and reports whether it is still within
    /// the allowance for the current window.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        // A poisoned lock only means some earlier holder panicked; the
        // counter map itself is still usable, so keep serving auth traffic.
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());

        // Drop windows that have already elapsed so the map does not grow
        // without bound under many distinct clients.
        hits.retain(|_, (start, _)| now.duration_since(*start) < self.window);

        let entry = hits.entry(key.to_string()).or_insert((now, 0));
        entry.1 += 1;
        entry.1 <= self.max_attempts
    }
}

/// Middleware applying the shared [`RateLimiter`] to a scope.
pub struct RateLimit;

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService { service }))
    }
}

pub struct RateLimitService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let allowed = match req.app_data::<web::Data<RateLimiter>>() {
            Some(limiter) => {
                let key = req
                    .connection_info()
                    .realip_remote_addr()
                    .unwrap_or("unknown")
                    .to_string();
                limiter.check(&key)
            }
            // No limiter registered (some test setups); let the request by.
            None => true,
        };

        if allowed {
            let fut = self.service.call(req);
            Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
        } else {
            Box::pin(async move {
                let response = HttpResponse::TooManyRequests()
                    .json(json!({
                        "success": false,
                        "message": "Too many authentication attempts, please try again later.",
                    }))
                    .map_into_right_body();
                Ok(req.into_response(response))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_max_attempts() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("5.6.7.8"));
        assert!(!limiter.check("1.2.3.4"));
    }

    #[test]
    fn test_check_survives_poisoned_lock() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        // Poison the mutex by panicking while holding it.
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = limiter.hits.lock().unwrap();
            panic!("holder panicked");
        }));
        assert!(limiter.hits.lock().is_err());

        // Counting still works afterwards.
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
    }

    #[test]
    fn test_window_reset() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check("1.2.3.4"));
    }
}
