use actix_web::{web, HttpResponse};

use crate::{
    api::metrics,
    config::AppConfig,
    models::InvestorSubmission,
    services::{investor_service, Mailer},
};

/// POST /api/v1/investor/submit - Seed partner onboarding form
#[utoipa::path(
    post,
    path = "/api/v1/investor/submit",
    tag = "Investor",
    request_body = InvestorSubmission,
    responses(
        (status = 200, description = "Application accepted, both emails sent"),
        (status = 400, description = "Validation failed; `errors` lists every invalid field"),
        (status = 500, description = "Application valid but the emails could not be sent")
    )
)]
pub async fn submit(
    mailer: web::Data<dyn Mailer>,
    config: web::Data<AppConfig>,
    request: web::Json<InvestorSubmission>,
) -> HttpResponse {
    log::info!("📨 POST /investor/submit");

    let application = match request.validate() {
        Ok(application) => application,
        Err(errors) => {
            log::warn!("❌ Seed partner application rejected: {} invalid field(s)", errors.len());
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": "Validation failed",
                "errors": errors
            }));
        }
    };

    match investor_service::send_application_emails(mailer.get_ref(), &config.mail, &application)
        .await
    {
        Ok(()) => {
            metrics::increment_applications();
            log::info!("✅ Seed partner application from {}", application.email);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": investor_service::SUCCESS_MESSAGE
            }))
        }
        Err(e) => {
            log::error!("❌ Error sending emails for {}: {}", application.email, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "message": investor_service::DELIVERY_FAILED_MESSAGE
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::test_app;
    use crate::database::test_store;
    use crate::services::{mail_service::testing::RecordingMailer, DisabledMailer};
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn form() -> Value {
        json!({
            "fullName": "Asha Rao",
            "panNumber": "ABCDE1234F",
            "email": "asha@example.com",
            "mobileNumber": "9876543210",
            "address": "12 MG Road",
            "alignmentConfirm": true,
            "readyToProceed": true,
            "acknowledgeTimelines": true
        })
    }

    #[actix_web::test]
    async fn test_valid_application_sends_two_emails() {
        let (_dir, store) = test_store();
        let mailer = Arc::new(RecordingMailer::default());
        let app = test_app!(store, mailer.clone());

        let req = test::TestRequest::post()
            .uri("/api/v1/investor/submit")
            .set_json(form())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(mailer.sent().len(), 2);
    }

    #[actix_web::test]
    async fn test_validation_errors_are_listed() {
        let (_dir, store) = test_store();
        let mailer = Arc::new(RecordingMailer::default());
        let app = test_app!(store, mailer.clone());

        let mut bad = form();
        bad["panNumber"] = json!("12345");
        bad.as_object_mut().unwrap().remove("address");

        let req = test::TestRequest::post()
            .uri("/api/v1/investor/submit")
            .set_json(bad)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"][0]["path"][0], "panNumber");
        assert_eq!(body["errors"][1]["path"][0], "address");
        assert!(mailer.sent().is_empty());
    }

    #[actix_web::test]
    async fn test_wrong_types_are_listed_with_other_errors() {
        let (_dir, store) = test_store();
        let mailer = Arc::new(RecordingMailer::default());
        let app = test_app!(store, mailer.clone());

        let mut bad = form();
        bad["panNumber"] = json!("bad");
        bad["alignmentConfirm"] = json!("yes");

        let req = test::TestRequest::post()
            .uri("/api/v1/investor/submit")
            .set_json(bad)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(
            body["errors"],
            json!([
                {"path": ["panNumber"], "message": "Invalid PAN format"},
                {"path": ["alignmentConfirm"], "message": "Expected boolean, received string"}
            ])
        );
        assert!(mailer.sent().is_empty());
    }

    #[actix_web::test]
    async fn test_mail_failure_is_500() {
        let (_dir, store) = test_store();
        let app = test_app!(store, Arc::new(DisabledMailer));

        let req = test::TestRequest::post()
            .uri("/api/v1/investor/submit")
            .set_json(form())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
