use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Alpha Portal API",
        version = "1.0.0",
        description = "Backend for the investor-relations site. \n\n**Authentication:** protected endpoints expect the user's email (the `accessToken` returned by login) in the `Authorization` header.\n\n**Storage:** users and dashboard data live in `users.xlsx` and `data.xlsx` under the sheets directory."
    ),
    paths(
        // Users
        crate::api::users::login,
        crate::api::users::register,
        crate::api::users::get_me,

        // Dashboard data
        crate::api::data::get_data,
        crate::api::data::upload,

        // Investor onboarding
        crate::api::investor::submit,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::LoginResponse,
            crate::services::auth_service::RegisterResponse,
            crate::services::auth_service::MeResponse,
            crate::models::AuthenticatedUser,
            crate::models::InvestorSubmission,
            crate::models::FieldError,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Users", description = "Login, registration and the current user."),
        (name = "Data", description = "Per-user dashboard data parsed from data.xlsx, and the admin workbook upload."),
        (name = "Investor", description = "Seed partner onboarding form; sends an admin notification and an applicant confirmation."),
        (name = "Health", description = "Health check and request counters."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "email_header",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "The logged-in user's email address",
                ))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/users/login",
            "/api/v1/users/register",
            "/api/v1/users/me",
            "/api/v1/data",
            "/api/v1/data/upload",
            "/api/v1/investor/submit",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
