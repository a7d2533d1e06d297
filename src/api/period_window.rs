use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};
use crate::model::period::{PeriodWindowResponse, SalaryPeriod};
use crate::store;
use crate::utils::thai_month::normalize_month_year;
use crate::utils::time::parse_bangkok_datetime;

#[derive(Debug, Deserialize, IntoParams)]
pub struct WindowQuery {
    #[serde(rename = "month-year")]
    #[param(example = "November2025")]
    pub month_year: Option<String>,
}

/// Body accepted by `PATCH /salary_sheets/api-window`.
///
/// Omitted keys are left unchanged; `null` clears a bound. Datetimes without an
/// offset are Asia/Bangkok local time.
#[derive(ToSchema)]
#[schema(example = json!({
    "month_year": "November2025",
    "api_is_active": true,
    "api_active_from": "2025-12-01T08:00:00",
    "api_active_to": null
}))]
#[allow(dead_code)]
pub struct ApiWindowPatch {
    month_year: String,
    api_is_active: Option<bool>,
    api_active_from: Option<String>,
    api_active_to: Option<String>,
}

/// Parsed PATCH body. The outer `Option` on a bound is "key present".
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPatch {
    pub month_year: String,
    pub api_is_active: Option<bool>,
    pub api_active_from: Option<Option<DateTime<Utc>>>,
    pub api_active_to: Option<Option<DateTime<Utc>>>,
}

impl WindowPatch {
    pub fn apply(&self, period: &mut SalaryPeriod) -> AppResult<()> {
        if let Some(active) = self.api_is_active {
            period.api_is_active = active;
        }
        if let Some(from) = self.api_active_from {
            period.api_active_from = from;
        }
        if let Some(to) = self.api_active_to {
            period.api_active_to = to;
        }

        if let (Some(from), Some(to)) = (period.api_active_from, period.api_active_to) {
            if from > to {
                return Err(AppError::Validation(
                    "api_active_from must not be after api_active_to".to_string(),
                ));
            }
        }
        Ok(())
    }
}

pub fn parse_window_patch(body: &Value) -> AppResult<WindowPatch> {
    let obj = body
        .as_object()
        .ok_or_else(|| AppError::Validation("invalid json body".to_string()))?;

    let month_year = obj
        .get("month_year")
        .or_else(|| obj.get("month-year"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("month_year required".to_string()))?;

    let api_is_active = match obj.get("api_is_active") {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            return Err(AppError::Validation(
                "api_is_active must be a boolean".to_string(),
            ));
        }
    };

    Ok(WindowPatch {
        month_year: normalize_month_year(month_year)?,
        api_is_active,
        api_active_from: parse_bound(obj.get("api_active_from"), "api_active_from")?,
        api_active_to: parse_bound(obj.get("api_active_to"), "api_active_to")?,
    })
}

fn parse_bound(value: Option<&Value>, key: &str) -> AppResult<Option<Option<DateTime<Utc>>>> {
    match value {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Some(None)),
        Some(Value::String(s)) => parse_bangkok_datetime(s)
            .map(|dt| Some(Some(dt)))
            .map_err(|e| AppError::Validation(format!("invalid {}: {}", key, e))),
        Some(_) => Err(AppError::Validation(format!("invalid {}: expected a datetime string", key))),
    }
}

/// List publication windows
#[utoipa::path(
    get,
    path = "/salary_sheets/api-window",
    params(WindowQuery),
    responses(
        (status = 200, description = "Periods newest first, bounds in Asia/Bangkok time", body = [PeriodWindowResponse]),
        (status = 400, description = "Unrecognised month label")
    ),
    tag = "Publication window"
)]
pub async fn list_windows(
    pool: web::Data<MySqlPool>,
    query: web::Query<WindowQuery>,
) -> AppResult<HttpResponse> {
    let month_year = match query.month_year.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => Some(normalize_month_year(m)?),
        _ => None,
    };

    let now = Utc::now();
    let windows: Vec<PeriodWindowResponse> = store::period::list(pool.get_ref(), month_year.as_deref())
        .await?
        .iter()
        .map(|p| PeriodWindowResponse::new(p, now))
        .collect();

    Ok(HttpResponse::Ok().json(windows))
}

/// Set the publication window of a period
#[utoipa::path(
    patch,
    path = "/salary_sheets/api-window",
    request_body = ApiWindowPatch,
    responses(
        (status = 200, description = "Updated window", body = PeriodWindowResponse),
        (status = 400, description = "Invalid body, datetime or bounds"),
        (status = 404, description = "Unknown period")
    ),
    tag = "Publication window"
)]
pub async fn patch_window(
    pool: web::Data<MySqlPool>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let patch = parse_window_patch(&body)?;

    let mut period = store::period::find(pool.get_ref(), &patch.month_year)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Period `{}` not found", patch.month_year)))?;

    patch.apply(&mut period)?;
    store::period::update_window(pool.get_ref(), &period).await?;

    info!(
        month_year = %period.month_year,
        api_is_active = period.api_is_active,
        from = ?period.api_active_from,
        to = ?period.api_active_to,
        "Publication window updated"
    );

    Ok(HttpResponse::Ok().json(PeriodWindowResponse::new(&period, Utc::now())))
}
