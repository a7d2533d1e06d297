use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_STATUS: &str = "ปกติ";

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_id": 1,
        "emp_code": "1001",
        "full_name": "สมชาย ใจดี",
        "status_name": "ปกติ",
        "created_at": "2025-11-30T09:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = "1001")]
    pub emp_code: String,

    #[schema(example = "สมชาย ใจดี")]
    pub full_name: String,

    #[schema(example = "ปกติ")]
    pub status_name: String,

    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = "1001")]
    pub emp_code: String,
    #[schema(example = "สมชาย ใจดี")]
    pub full_name: String,
}
