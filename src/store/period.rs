use sqlx::{MySqlConnection, MySqlPool};

use crate::model::period::SalaryPeriod;

/// Creates the period row if it does not exist yet.
pub async fn ensure(conn: &mut MySqlConnection, month_year: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT IGNORE INTO salary_periods (month_year) VALUES (?)")
        .bind(month_year)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn find(pool: &MySqlPool, month_year: &str) -> Result<Option<SalaryPeriod>, sqlx::Error> {
    sqlx::query_as::<_, SalaryPeriod>(
        r#"
        SELECT month_year, api_is_active, api_active_from, api_active_to, created_at
        FROM salary_periods
        WHERE month_year = ?
        "#,
    )
    .bind(month_year)
    .fetch_optional(pool)
    .await
}

/// Newest first; optionally restricted to a single period.
pub async fn list(pool: &MySqlPool, month_year: Option<&str>) -> Result<Vec<SalaryPeriod>, sqlx::Error> {
    sqlx::query_as::<_, SalaryPeriod>(
        r#"
        SELECT month_year, api_is_active, api_active_from, api_active_to, created_at
        FROM salary_periods
        WHERE (? IS NULL OR month_year = ?)
        ORDER BY created_at DESC, month_year DESC
        "#,
    )
    .bind(month_year)
    .bind(month_year)
    .fetch_all(pool)
    .await
}

pub async fn update_window(
    pool: &MySqlPool,
    period: &SalaryPeriod,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE salary_periods
        SET api_is_active = ?, api_active_from = ?, api_active_to = ?
        WHERE month_year = ?
        "#,
    )
    .bind(period.api_is_active)
    .bind(period.api_active_from)
    .bind(period.api_active_to)
    .bind(&period.month_year)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_month_years(pool: &MySqlPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT p.month_year
        FROM salary_periods p
        JOIN salary_sheets s ON s.month_year = p.month_year
        ORDER BY p.month_year DESC
        "#,
    )
    .fetch_all(pool)
    .await
}
