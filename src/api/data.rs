use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, ResponseError};
use futures::StreamExt;

use crate::{
    config::AppConfig,
    database::SheetStore,
    models::AuthenticatedUser,
    services::{
        data_service,
        upload_service::{self, UploadedFile},
    },
    utils::error::{AppError, AppResult},
};

/// GET /api/v1/data - Dashboard payload parsed from the caller's worksheet
#[utoipa::path(
    get,
    path = "/api/v1/data",
    tag = "Data",
    responses(
        (status = 200, description = "Labels, summaries, comparison stats and performance series"),
        (status = 401, description = "Missing or unknown Authorization header"),
        (status = 404, description = "The user has no sheet, or it is empty")
    ),
    security(
        ("email_header" = [])
    )
)]
pub async fn get_data(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<SheetStore>,
) -> HttpResponse {
    log::info!("📊 GET /data - {}", user.email);

    match data_service::get_user_data(&store, &user.email).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => {
            log::warn!("❌ Failed to load data for {}: {}", user.email, e);
            e.error_response()
        }
    }
}

/// Drains the multipart stream, keeping file parts only.
async fn read_files(payload: &mut Multipart, max_bytes: usize) -> AppResult<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| AppError::InvalidRequest(format!("Malformed multipart body: {}", e)))?;

        let is_file = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some();
        let name = field.name().unwrap_or_default().to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::InvalidRequest(format!("Malformed multipart body: {}", e)))?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::InvalidRequest(format!(
                    "File \"{}\" exceeds the {} byte upload limit",
                    name, max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if is_file {
            files.push(UploadedFile { field: name, bytes });
        }
    }

    Ok(files)
}

/// POST /api/v1/data/upload - Replace data.xlsx / users.xlsx (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/data/upload",
    tag = "Data",
    responses(
        (status = 200, description = "Workbooks replaced"),
        (status = 400, description = "No file, unknown field, or not an .xlsx file"),
        (status = 401, description = "Missing or unknown Authorization header"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(
        ("email_header" = [])
    )
)]
pub async fn upload(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<SheetStore>,
    config: web::Data<AppConfig>,
    mut payload: Multipart,
) -> HttpResponse {
    log::info!("📤 POST /data/upload - {}", user.email);

    if !user.admin {
        log::warn!("⛔ Upload refused for non-admin {}", user.email);
        return AppError::Forbidden("Admin access required".to_string()).error_response();
    }

    let files = match read_files(&mut payload, config.upload_max_bytes).await {
        Ok(files) => files,
        Err(e) => {
            log::warn!("❌ Upload rejected: {}", e);
            return e.error_response();
        }
    };

    match upload_service::store_uploads(&store, files).await {
        Ok(replaced) => {
            log::info!("✅ Upload complete: {:?}", replaced);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "File uploaded successfully",
                "files": replaced
            }))
        }
        Err(e) => {
            log::error!("❌ Upload failed: {}", e);
            e.error_response()
        }
    }
}
