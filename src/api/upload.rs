use actix_multipart::{Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::ingest;
use crate::store;
use crate::utils::item_classifier::ItemClassifier;

pub const FILE_FIELD: &str = "file";

/// Multipart form accepted by `/upload_excel`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "success")]
    pub status: &'static str,
    #[schema(example = "November2025")]
    pub sheet: String,
    /// Salary item rows written.
    #[schema(example = 42)]
    pub rows_inserted: u64,
    #[schema(example = 3)]
    pub employees: usize,
}

pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Upload a payroll workbook
#[utoipa::path(
    post,
    path = "/upload_excel",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Workbook stored", body = UploadResponse),
        (status = 400, description = "Missing file, unreadable workbook, unknown month label or unknown salary items"),
        (status = 500, description = "Database failure, nothing was written")
    ),
    tag = "Upload"
)]
#[instrument(name = "upload_excel", skip_all, fields(upload_id = %Uuid::new_v4()))]
pub async fn upload_excel(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    classifier: web::Data<ItemClassifier>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let upload = read_file_field(payload, config.max_upload_bytes).await?;
    info!(filename = %upload.filename, bytes = upload.bytes.len(), "Upload received");

    let bytes = upload.bytes;
    let parsed = web::block(move || ingest::parse_workbook(bytes)).await??;
    info!(
        sheet = %parsed.month_year,
        rows = parsed.rows.len(),
        columns = parsed.item_columns.len(),
        "Workbook parsed"
    );

    let groups = classifier
        .resolve_columns(pool.get_ref(), &parsed.item_columns)
        .await?;
    let records = parsed.classify(&groups)?;

    let summary =
        store::salary::upsert_records(pool.get_ref(), &parsed.month_year, &records).await?;
    info!(
        sheet = %parsed.month_year,
        employees = summary.employees,
        items = summary.items,
        "Upload committed"
    );

    Ok(HttpResponse::Created().json(UploadResponse {
        status: "success",
        sheet: parsed.month_year,
        rows_inserted: summary.items,
        employees: summary.employees,
    }))
}

/// Reads the `file` part into memory, enforcing `max_bytes`.
async fn read_file_field(mut payload: Multipart, max_bytes: usize) -> AppResult<UploadedFile> {
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        if filename.is_empty() {
            return Err(AppError::Validation("Empty filename".to_string()));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::Validation(format!(
                    "File is larger than {} bytes",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        return Ok(UploadedFile { filename, bytes });
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {}", e))
}
