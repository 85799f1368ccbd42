pub mod data;
pub mod health;
pub mod investor;
pub mod metrics;
pub mod swagger;
pub mod users;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::{middleware::AuthMiddleware, utils::error::AppError};

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("❌ {} {} - bad JSON body: {}", req.method(), req.path(), err);
    AppError::InvalidRequest(format!("Invalid request body: {}", err)).into()
}

/// Registers every route. Shared state (`SheetStore`, `AppConfig`,
/// `dyn Mailer`) is provided by the caller as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        // Health check
        .route("/health", web::get().to(health::health_check))
        // Metrics
        .route("/metrics", web::get().to(metrics::get_metrics))
        // Users: login / register are public, /me needs the header
        .service(
            web::scope("/api/v1/users")
                .route("/login", web::post().to(users::login))
                .route("/register", web::post().to(users::register))
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(users::get_me)),
                ),
        )
        // Dashboard data + admin upload
        .service(
            web::scope("/api/v1/data")
                .wrap(AuthMiddleware)
                .route("", web::get().to(data::get_data))
                .route("/", web::get().to(data::get_data))
                .route("/upload", web::post().to(data::upload)),
        )
        // Investor onboarding
        .service(
            web::scope("/api/v1/investor")
                .route("/submit", web::post().to(investor::submit)),
        );
}
