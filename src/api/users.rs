use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    api::metrics,
    config::AppConfig,
    database::SheetStore,
    models::AuthenticatedUser,
    services::auth_service::{self, LoginRequest, LoginResponse, MeResponse, RegisterResponse},
};

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; accessToken is the user's email", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Unknown user or wrong password")
    )
)]
pub async fn login(
    store: web::Data<SheetStore>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("🔐 POST /users/login - email: {}", email);

    match auth_service::login(&store, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {} (admin: {})", email, response.admin);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            metrics::increment_login_failures();
            log::warn!("❌ Login failed: {} - {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Registration successful", body = RegisterResponse),
        (status = 400, description = "Missing fields or user already exists")
    )
)]
pub async fn register(
    store: web::Data<SheetStore>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /users/register - email: {}", email);

    match auth_service::register(&store, &request, config.hash_passwords).await {
        Ok(response) => {
            metrics::increment_registrations();
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing or unknown Authorization header")
    ),
    security(
        ("email_header" = [])
    )
)]
pub async fn get_me(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    log::info!("👤 GET /users/me - {}", user.email);

    HttpResponse::Ok().json(MeResponse {
        message: "User retrieved successfully".to_string(),
        user: user.into_inner(),
    })
}
