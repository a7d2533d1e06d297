use sqlx::MySqlPool;

use crate::model::tax_certificate::TaxCertificate;

pub async fn find(
    pool: &MySqlPool,
    year: &str,
    emp_code: &str,
) -> Result<Option<TaxCertificate>, sqlx::Error> {
    sqlx::query_as::<_, TaxCertificate>(
        r#"
        SELECT t.year, t.url_pdf, e.emp_code, e.full_name, e.status_name
        FROM salary_50tawi t
        JOIN employees e ON e.employee_id = t.employee_id
        WHERE t.year = ? AND e.emp_code = ?
        "#,
    )
    .bind(year)
    .bind(emp_code)
    .fetch_optional(pool)
    .await
}

pub async fn upsert(
    pool: &MySqlPool,
    year: &str,
    employee_id: u64,
    url_pdf: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO salary_50tawi (year, employee_id, url_pdf)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE url_pdf = ?
        "#,
    )
    .bind(year)
    .bind(employee_id)
    .bind(url_pdf)
    .bind(url_pdf)
    .execute(pool)
    .await?;

    Ok(())
}
