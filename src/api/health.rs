use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::{SheetStore, WorkbookKind};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
    pub workbooks_present: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "A workbook is missing from the sheets directory", body = HealthResponse)
    )
)]
pub async fn health_check(store: web::Data<SheetStore>) -> impl Responder {
    let workbooks_present = store.path(WorkbookKind::Users).exists()
        && store.path(WorkbookKind::Data).exists();

    let body = HealthResponse {
        status: if workbooks_present { "healthy" } else { "degraded" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        workbooks_present,
    };

    if workbooks_present {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::test_app;
    use crate::database::{test_store, WorkbookKind};
    use crate::services::mail_service::testing::RecordingMailer;
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_reports_missing_workbook() {
        let (_dir, store) = test_store();
        let data_path = store.path(WorkbookKind::Data);
        let app = test_app!(store, Arc::new(RecordingMailer::default()));

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");

        std::fs::remove_file(data_path).unwrap();
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
