use actix_web::{HttpResponse, web};
use serde::Serialize;
use sqlx::MySqlPool;
use std::cmp::Reverse;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::model::employee::EmployeeSummary;
use crate::store;
use crate::utils::thai_month::month_year_sort_key;

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub employees: Vec<EmployeeSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthYearListResponse {
    #[schema(example = json!(["December2025", "November2025"]))]
    pub month_years: Vec<String>,
}

/// Employees with a name, ordered by code
#[utoipa::path(
    get,
    path = "/salary/employees",
    responses((status = 200, body = EmployeeListResponse)),
    tag = "Lookups"
)]
pub async fn list_employees(pool: web::Data<MySqlPool>) -> AppResult<HttpResponse> {
    let employees = store::salary::list_employees(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(EmployeeListResponse { employees }))
}

/// Periods that hold salary data, newest first
#[utoipa::path(
    get,
    path = "/salary/month-years",
    responses((status = 200, body = MonthYearListResponse)),
    tag = "Lookups"
)]
pub async fn list_month_years(pool: web::Data<MySqlPool>) -> AppResult<HttpResponse> {
    let mut month_years = store::period::list_month_years(pool.get_ref()).await?;
    sort_newest_first(&mut month_years);
    Ok(HttpResponse::Ok().json(MonthYearListResponse { month_years }))
}

/// Chronological, newest first. Tokens that do not parse sort last.
fn sort_newest_first(month_years: &mut [String]) {
    month_years.sort_by_key(|m| Reverse(month_year_sort_key(m)));
}
