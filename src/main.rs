mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Compress, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppConfig,
    database::SheetStore,
    services::{data_service, DisabledMailer, Mailer, SmtpMailer},
};

fn build_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    match SmtpMailer::from_config(&config.mail) {
        Ok(mailer) => {
            log::info!(
                "📧 SMTP relay: {}:{}",
                config.mail.host.as_deref().unwrap_or("-"),
                config.mail.port
            );
            Arc::new(mailer)
        }
        Err(e) => {
            log::warn!("⚠️  Email disabled: {}", e);
            Arc::new(DisabledMailer)
        }
    }
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .supports_credentials()
    };

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    api::metrics::mark_started();

    log::info!("🚀 Starting Alpha Portal...");
    log::info!("📁 Sheets directory: {}", config.sheets_dir.display());

    let store = SheetStore::open(&config.sheets_dir, data_service::default_user_rows())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    log::info!("✅ Workbooks ready");

    if config.mail.admin_email.is_none() {
        log::warn!("⚠️  ADMIN_EMAIL not set, investor applications will fail to send");
    }
    let mailer = build_mailer(&config);

    let bind = (config.host.clone(), config.port);
    log::info!("🌐 Server starting on {}:{}", bind.0, bind.1);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", bind.0, bind.1);

    let store_data = web::Data::new(store);
    let config_data = web::Data::new(config);
    let mailer_data: web::Data<dyn Mailer> = web::Data::from(mailer);

    HttpServer::new(move || {
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(config_data.clone())
            .app_data(mailer_data.clone())
            .wrap(build_cors(&config_data.cors_origins))
            .wrap(middleware::RequestMetrics)
            .wrap(middleware::SecurityHeaders)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await
}
