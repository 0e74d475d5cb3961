use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskhive::auth::RateLimiter;
use taskhive::config::Config;
use taskhive::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    // Panics here are deliberate: the process must not start without its
    // required environment (JWT_SECRET, DATABASE_URL).
    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Shared across workers so the auth rate limit counts globally.
    let rate_limiter = web::Data::new(RateLimiter::from_config(&config.rate_limit));
    let auth_config = web::Data::new(config.auth.clone());
    let pool_data = web::Data::new(pool);

    log::info!("Starting taskhive server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    let cors_origin = config.cors_origin.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(auth_config.clone())
            .app_data(rate_limiter.clone())
            .app_data(web::JsonConfig::default().error_handler(taskhive::error::json_error_handler))
            .wrap(
                Cors::default()
                    .allowed_origin(&cors_origin)
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(web::scope("/api").configure(routes::config))
            .default_service(web::route().to(routes::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
