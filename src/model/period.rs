use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::utils::time::utc_to_bangkok;

/// Payroll period keyed by month-year token, with its publication window (UTC).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SalaryPeriod {
    pub month_year: String,
    pub api_is_active: bool,
    pub api_active_from: Option<DateTime<Utc>>,
    pub api_active_to: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SalaryPeriod {
    /// Whether `now` falls inside the configured bounds. Missing bounds are open.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(from) = self.api_active_from {
            if now < from {
                return false;
            }
        }
        if let Some(to) = self.api_active_to {
            if now > to {
                return false;
            }
        }
        true
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.api_is_active && self.is_open_at(now)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PeriodWindowResponse {
    #[schema(example = "November2025")]
    pub month_year: String,
    pub api_is_active: bool,
    #[schema(example = "2025-12-01T08:00:00+07:00")]
    pub api_active_from_bkk: Option<String>,
    #[schema(example = "2025-12-31T23:59:59+07:00")]
    pub api_active_to_bkk: Option<String>,
    pub is_active_now: bool,
}

impl PeriodWindowResponse {
    pub fn new(period: &SalaryPeriod, now: DateTime<Utc>) -> Self {
        Self {
            month_year: period.month_year.clone(),
            api_is_active: period.api_is_active,
            api_active_from_bkk: period.api_active_from.map(|t| utc_to_bangkok(t).to_rfc3339()),
            api_active_to_bkk: period.api_active_to.map(|t| utc_to_bangkok(t).to_rfc3339()),
            is_active_now: period.is_active_at(now),
        }
    }
}
