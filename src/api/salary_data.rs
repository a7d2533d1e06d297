use actix_web::{HttpResponse, web};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::ingest::parse_amount;
use crate::model::employee::DEFAULT_STATUS;
use crate::model::limits::{
    MAX_EMP_CODE_CHARS, MAX_STATUS_CHARS, MAX_TEXT_CHARS, check_amount, check_len,
};
use crate::model::salary::{SalaryDataResponse, SalaryItem, SalaryRecord, to_datalist};
use crate::store;
use crate::utils::item_classifier::ItemClassifier;
use crate::utils::thai_month::normalize_month_year;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SalaryDataQuery {
    /// `November2025` or a Thai label such as `พ.ย.2568`
    #[serde(rename = "month-year")]
    #[param(example = "November2025")]
    pub month_year: Option<String>,

    #[param(example = "1001")]
    pub emp_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "month-year": "November2025",
    "emp_id": "1001",
    "full_name": "สมชาย ใจดี",
    "status": "ปกติ",
    "datalist": {
        "earnings": { "เงินเดือน": "30000", "โบนัส": 5000 },
        "deductions": { "ประกันสังคม": "750.00" },
        "summary": {}
    }
}))]
pub struct SalaryDataPayload {
    #[serde(rename = "month-year")]
    pub month_year: Option<String>,
    pub emp_id: Option<String>,
    pub full_name: Option<String>,
    pub status: Option<String>,
    /// group -> item name -> amount (number or numeric string)
    #[serde(default)]
    #[schema(value_type = Object)]
    pub datalist: BTreeMap<String, BTreeMap<String, Value>>,
}

/// Get one employee's salary for a period
#[utoipa::path(
    get,
    path = "/salary_data/data",
    params(SalaryDataQuery),
    responses(
        (status = 200, description = "Salary record", body = SalaryDataResponse),
        (status = 400, description = "Missing parameters or unrecognised month label"),
        (status = 404, description = "No data, or the period is outside its publication window")
    ),
    tag = "Salary"
)]
pub async fn get_salary_data(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<SalaryDataQuery>,
) -> AppResult<HttpResponse> {
    let (month_year, emp_code) = required_keys(query.month_year.as_deref(), query.emp_id.as_deref())?;

    let sheet = store::salary::find_sheet(pool.get_ref(), &month_year, &emp_code)
        .await?
        .ok_or_else(|| AppError::NotFound("Salary data not found".to_string()))?;

    let published = store::period::find(pool.get_ref(), &month_year)
        .await?
        .map(|period| period.is_open_at(Utc::now()))
        .unwrap_or(false);
    if !published {
        debug!(month_year = %month_year, emp_code = %emp_code, "Period outside publication window");
        return Err(AppError::NotFound("Salary data not found".to_string()));
    }

    let items = store::salary::list_items(pool.get_ref(), sheet.sheet_id).await?;

    Ok(HttpResponse::Ok().json(SalaryDataResponse {
        sheet: sheet.month_year,
        emp_code: sheet.emp_code,
        full_name: sheet.full_name,
        status: sheet.status_name,
        datalist: to_datalist(&config.item_groups, &items),
    }))
}

/// Create or replace one employee's salary for a period
///
/// Items with a metadata entry take the metadata group; other items keep the
/// group they are listed under.
#[utoipa::path(
    post,
    path = "/salary_data/data",
    request_body = SalaryDataPayload,
    responses(
        (status = 201, description = "Salary stored", body = Object, example = json!({
            "status": "updated",
            "items": 3
        })),
        (status = 400, description = "Missing keys, unknown group or unrecognised month label")
    ),
    tag = "Salary"
)]
pub async fn upsert_salary_data(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    classifier: web::Data<ItemClassifier>,
    payload: web::Json<SalaryDataPayload>,
) -> AppResult<HttpResponse> {
    let payload = payload.into_inner();
    let (month_year, emp_code) =
        required_keys(payload.month_year.as_deref(), payload.emp_id.as_deref())?;
    let entries = manual_entries(&config, &payload.datalist)?;

    let full_name = payload.full_name.unwrap_or_default();
    let status = payload
        .status
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());
    check_len("emp_id", &emp_code, MAX_EMP_CODE_CHARS)?;
    check_len("full_name", &full_name, MAX_TEXT_CHARS)?;
    check_len("status", &status, MAX_STATUS_CHARS)?;

    let mut record = SalaryRecord::new(emp_code, full_name, status);
    for (listed_group, item_name, amount) in entries {
        let item_group = classifier
            .lookup(pool.get_ref(), &item_name)
            .await?
            .unwrap_or(listed_group);
        record.set_item(SalaryItem {
            item_group,
            item_name,
            amount,
        });
    }

    let summary =
        store::salary::upsert_records(pool.get_ref(), &month_year, std::slice::from_ref(&record))
            .await?;
    info!(month_year = %month_year, emp_code = %record.emp_code, items = summary.items, "Salary data updated");

    Ok(HttpResponse::Created().json(json!({
        "status": "updated",
        "items": summary.items
    })))
}

fn required_keys(month_year: Option<&str>, emp_id: Option<&str>) -> AppResult<(String, String)> {
    let month_year = month_year.map(str::trim).filter(|s| !s.is_empty());
    let emp_id = emp_id.map(str::trim).filter(|s| !s.is_empty());

    match (month_year, emp_id) {
        (Some(m), Some(e)) => Ok((normalize_month_year(m)?, e.to_string())),
        _ => Err(AppError::Validation("month-year and emp_id required".to_string())),
    }
}

/// Flattens a manual datalist into `(group, item, amount)`, dropping non-numeric amounts.
fn manual_entries(
    config: &Config,
    datalist: &BTreeMap<String, BTreeMap<String, Value>>,
) -> AppResult<Vec<(String, String, Decimal)>> {
    let mut entries = Vec::new();

    for (group, items) in datalist {
        if !config.is_known_group(group) {
            return Err(AppError::Validation(format!(
                "Unknown item group `{}`, expected one of: {}",
                group,
                config.item_groups.join(", ")
            )));
        }

        for (name, value) in items {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            check_len("Item name", name, MAX_TEXT_CHARS)?;
            match json_amount(value) {
                Some(amount) => {
                    check_amount(name, amount)?;
                    entries.push((group.clone(), name.to_string(), amount));
                }
                None => debug!(item_name = %name, "Skipping non-numeric amount"),
            }
        }
    }

    Ok(entries)
}

fn json_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok()
            .map(|d| d.round_dp(2)),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test as actix_test};

    fn datalist(value: Value) -> BTreeMap<String, BTreeMap<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn required_keys_normalise_thai_label() {
        let (month, emp) = required_keys(Some(" พ.ย.2568 "), Some(" 1001 ")).unwrap();
        assert_eq!(month, "November2025");
        assert_eq!(emp, "1001");
    }

    #[test]
    fn required_keys_reject_missing() {
        assert!(matches!(
            required_keys(None, Some("1001")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            required_keys(Some("November2025"), Some("  ")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            required_keys(Some("ธ.ค.abcd"), Some("1001")),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn manual_entries_parse_numbers_and_strings() {
        let config = Config::for_tests();
        let entries = manual_entries(
            &config,
            &datalist(json!({
                "earnings": { "เงินเดือน": "30,000", "โบนัส": 5000.257 },
                "deductions": { "ประกันสังคม": "-", "ภาษี": null }
            })),
        )
        .unwrap();

        assert_eq!(
            entries,
            vec![
                ("earnings".to_string(), "เงินเดือน".to_string(), Decimal::from(30000)),
                (
                    "earnings".to_string(),
                    "โบนัส".to_string(),
                    Decimal::from_str("5000.26").unwrap()
                ),
            ]
        );
    }

    #[test]
    fn manual_entries_reject_unknown_group() {
        let config = Config::for_tests();
        let err = manual_entries(&config, &datalist(json!({ "bonus": { "x": 1 } }))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn manual_entries_reject_values_the_columns_cannot_hold() {
        let config = Config::for_tests();

        let err = manual_entries(
            &config,
            &datalist(json!({ "earnings": { "เงินเดือน": 1e15 } })),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let long_item = "ก".repeat(256);
        let err = manual_entries(
            &config,
            &datalist(json!({ "earnings": { long_item: 1 } })),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[actix_web::test]
    async fn get_without_emp_id_is_bad_request() {
        let config = Config::for_tests();
        let pool = MySqlPool::connect_lazy(&config.database_url).unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(config))
                .route("/salary_data/data", web::get().to(get_salary_data)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/salary_data/data?month-year=November2025")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "month-year and emp_id required");
    }

    #[actix_web::test]
    async fn post_with_unknown_group_is_bad_request() {
        let config = Config::for_tests();
        let pool = MySqlPool::connect_lazy(&config.database_url).unwrap();
        let classifier = ItemClassifier::from_config(&config);
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(classifier))
                .route("/salary_data/data", web::post().to(upsert_salary_data)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/salary_data/data")
            .set_json(json!({
                "month-year": "November2025",
                "emp_id": "1001",
                "datalist": { "perks": { "ค่ากาแฟ": 100 } }
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
