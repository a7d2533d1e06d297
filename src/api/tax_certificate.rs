use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};
use crate::model::limits::{MAX_URL_CHARS, MAX_YEAR_CHARS, check_len};
use crate::model::tax_certificate::{TaxCertificateResponse, UpsertTaxCertificate};
use crate::store;

#[derive(Debug, Deserialize, IntoParams)]
pub struct TaxCertificateQuery {
    /// Buddhist-era year
    #[param(example = "2568")]
    pub year: Option<String>,
    #[param(example = "1001")]
    pub emp_id: Option<String>,
}

/// Get an employee's 50 ทวิ certificate link
#[utoipa::path(
    get,
    path = "/50tawi/data",
    params(TaxCertificateQuery),
    responses(
        (status = 200, description = "Certificate link", body = TaxCertificateResponse),
        (status = 400, description = "year or emp_id missing"),
        (status = 404, description = "No certificate for that year and employee")
    ),
    tag = "50 ทวิ"
)]
pub async fn get_certificate(
    pool: web::Data<MySqlPool>,
    query: web::Query<TaxCertificateQuery>,
) -> AppResult<HttpResponse> {
    let (year, emp_code) = required_keys(query.year.as_deref(), query.emp_id.as_deref())?;

    let certificate = store::tax_certificate::find(pool.get_ref(), year, emp_code)
        .await?
        .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;

    Ok(HttpResponse::Ok().json(TaxCertificateResponse::from(certificate)))
}

/// Create or replace an employee's 50 ทวิ certificate link
#[utoipa::path(
    post,
    path = "/50tawi/data",
    request_body = UpsertTaxCertificate,
    responses(
        (status = 201, description = "Link stored", body = Object, example = json!({ "status": "updated" })),
        (status = 400, description = "year or emp_id missing"),
        (status = 404, description = "Employee not found")
    ),
    tag = "50 ทวิ"
)]
pub async fn upsert_certificate(
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpsertTaxCertificate>,
) -> AppResult<HttpResponse> {
    let (year, emp_code) = required_keys(payload.year.as_deref(), payload.emp_id.as_deref())?;
    let url_pdf = payload
        .url_pdf
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    check_len("year", year, MAX_YEAR_CHARS)?;
    if let Some(url) = url_pdf {
        check_len("url_pdf", url, MAX_URL_CHARS)?;
    }

    let employee = store::salary::find_employee(pool.get_ref(), emp_code)
        .await?
        .ok_or_else(|| AppError::NotFound("employee not found".to_string()))?;

    store::tax_certificate::upsert(pool.get_ref(), year, employee.employee_id, url_pdf).await?;
    info!(year = %year, emp_code = %emp_code, "50 ทวิ link updated");

    Ok(HttpResponse::Created().json(json!({ "status": "updated" })))
}

fn required_keys<'a>(year: Option<&'a str>, emp_id: Option<&'a str>) -> AppResult<(&'a str, &'a str)> {
    let year = year.map(str::trim).filter(|s| !s.is_empty());
    let emp_id = emp_id.map(str::trim).filter(|s| !s.is_empty());

    match (year, emp_id) {
        (Some(y), Some(e)) => Ok((y, e)),
        _ => Err(AppError::Validation("year and emp_id required".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test as actix_test};

    #[test]
    fn keys_are_trimmed() {
        assert_eq!(required_keys(Some(" 2568"), Some("1001 ")).unwrap(), ("2568", "1001"));
        assert!(required_keys(Some("2568"), None).is_err());
    }

    #[actix_web::test]
    async fn post_without_year_is_bad_request() {
        let pool = MySqlPool::connect_lazy("mysql://root@127.0.0.1:3306/payroll_test").unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .route("/50tawi/data", web::post().to(upsert_certificate)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/50tawi/data")
            .set_json(json!({ "emp_id": "1001", "url_pdf": "https://files.example.com/a.pdf" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "year and emp_id required");
    }
}
