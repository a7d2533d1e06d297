use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::IntoParams;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::export::{XLSX_CONTENT_TYPE, build_pivot, write_xlsx};
use crate::store;
use crate::utils::thai_month::normalize_month_year;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    #[serde(rename = "month-year")]
    #[param(example = "November2025")]
    pub month_year: Option<String>,
}

/// Download one period as an Excel pivot
#[utoipa::path(
    get,
    path = "/salary_data/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "Workbook attachment `payroll_<month-year>.xlsx`"),
        (status = 400, description = "month-year missing or unrecognised"),
        (status = 404, description = "Unknown period or no salary data")
    ),
    tag = "Salary"
)]
pub async fn export_period(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<ExportQuery>,
) -> AppResult<HttpResponse> {
    let month_year = query
        .month_year
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::Validation("month-year required".to_string()))?;
    let month_year = normalize_month_year(month_year)?;

    if store::period::find(pool.get_ref(), &month_year).await?.is_none() {
        return Err(AppError::NotFound("sheet not found".to_string()));
    }

    let rows = store::salary::export_rows(pool.get_ref(), &month_year).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound("no salary data".to_string()));
    }

    let groups = config.item_groups.clone();
    let bytes = web::block(move || write_xlsx(&build_pivot(&rows, &groups))).await??;

    info!(month_year = %month_year, bytes = bytes.len(), "Export generated");

    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(format!("payroll_{}.xlsx", month_year))],
        })
        .body(bytes))
}
