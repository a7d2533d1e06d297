use sqlx::{Connection, Executor, MySql, MySqlConnection, MySqlPool, QueryBuilder};
use tracing::debug;

use crate::model::employee::{Employee, EmployeeSummary};
use crate::model::salary::{ExportRow, SalaryItem, SalaryRecord, SheetView};
use crate::store::period;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpsertSummary {
    pub employees: usize,
    pub items: u64,
}

/// Writes every record for one period in a single transaction.
///
/// Per record: upsert the employee by code, upsert the sheet by (employee, period),
/// then replace the sheet's items wholesale. Any failure rolls back the whole batch.
///
/// Runs at READ COMMITTED so concurrent uploads do not take gap locks on
/// `salary_items` and deadlock each other.
pub async fn upsert_records(
    pool: &MySqlPool,
    month_year: &str,
    records: &[SalaryRecord],
) -> Result<UpsertSummary, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    // Applies to the next transaction on this connection only
    (&mut *conn)
        .execute("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
        .await?;
    let mut tx = conn.begin().await?;

    period::ensure(&mut *tx, month_year).await?;

    let mut summary = UpsertSummary::default();
    for record in records {
        let employee_id = upsert_employee(&mut *tx, record).await?;
        let sheet_id = upsert_sheet(&mut *tx, employee_id, month_year).await?;
        let inserted = replace_items(&mut *tx, sheet_id, &record.items).await?;

        debug!(emp_code = %record.emp_code, sheet_id, inserted, "Sheet written");

        summary.employees += 1;
        summary.items += inserted;
    }

    tx.commit().await?;

    Ok(summary)
}

async fn upsert_employee(
    conn: &mut MySqlConnection,
    record: &SalaryRecord,
) -> Result<u64, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO employees (emp_code, full_name, status_name)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE full_name = ?, status_name = ?
        "#,
    )
    .bind(&record.emp_code)
    .bind(&record.full_name)
    .bind(&record.status)
    .bind(&record.full_name)
    .bind(&record.status)
    .execute(&mut *conn)
    .await?;

    sqlx::query_scalar::<_, u64>("SELECT employee_id FROM employees WHERE emp_code = ?")
        .bind(&record.emp_code)
        .fetch_one(&mut *conn)
        .await
}

async fn upsert_sheet(
    conn: &mut MySqlConnection,
    employee_id: u64,
    month_year: &str,
) -> Result<u64, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO salary_sheets (employee_id, month_year)
        VALUES (?, ?)
        ON DUPLICATE KEY UPDATE updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(employee_id)
    .bind(month_year)
    .execute(&mut *conn)
    .await?;

    sqlx::query_scalar::<_, u64>(
        "SELECT sheet_id FROM salary_sheets WHERE employee_id = ? AND month_year = ?",
    )
    .bind(employee_id)
    .bind(month_year)
    .fetch_one(&mut *conn)
    .await
}

/// The caller holds the sheet row lock from `upsert_sheet`, so no other upload
/// can add items to this sheet until the transaction ends.
async fn replace_items(
    conn: &mut MySqlConnection,
    sheet_id: u64,
    items: &[SalaryItem],
) -> Result<u64, sqlx::Error> {
    let has_items = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM salary_items WHERE sheet_id = ?)",
    )
    .bind(sheet_id)
    .fetch_one(&mut *conn)
    .await?;

    // New sheets have nothing to clear
    if has_items != 0 {
        sqlx::query("DELETE FROM salary_items WHERE sheet_id = ?")
            .bind(sheet_id)
            .execute(&mut *conn)
            .await?;
    }

    if items.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<MySql> =
        QueryBuilder::new("INSERT INTO salary_items (sheet_id, item_group, item_name, amount) ");
    builder.push_values(items, |mut row, item| {
        row.push_bind(sheet_id)
            .push_bind(item.item_group.clone())
            .push_bind(item.item_name.clone())
            .push_bind(item.amount);
    });

    let result = builder.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

pub async fn find_sheet(
    pool: &MySqlPool,
    month_year: &str,
    emp_code: &str,
) -> Result<Option<SheetView>, sqlx::Error> {
    sqlx::query_as::<_, SheetView>(
        r#"
        SELECT s.sheet_id, s.month_year, e.emp_code, e.full_name, e.status_name
        FROM salary_sheets s
        JOIN employees e ON e.employee_id = s.employee_id
        WHERE s.month_year = ? AND e.emp_code = ?
        "#,
    )
    .bind(month_year)
    .bind(emp_code)
    .fetch_optional(pool)
    .await
}

pub async fn list_items(pool: &MySqlPool, sheet_id: u64) -> Result<Vec<SalaryItem>, sqlx::Error> {
    sqlx::query_as::<_, SalaryItem>(
        r#"
        SELECT item_group, item_name, amount
        FROM salary_items
        WHERE sheet_id = ?
        ORDER BY item_id
        "#,
    )
    .bind(sheet_id)
    .fetch_all(pool)
    .await
}

pub async fn find_employee(pool: &MySqlPool, emp_code: &str) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        r#"
        SELECT employee_id, emp_code, full_name, status_name, created_at
        FROM employees
        WHERE emp_code = ?
        "#,
    )
    .bind(emp_code)
    .fetch_optional(pool)
    .await
}

pub async fn list_employees(pool: &MySqlPool) -> Result<Vec<EmployeeSummary>, sqlx::Error> {
    sqlx::query_as::<_, EmployeeSummary>(
        r#"
        SELECT DISTINCT emp_code, full_name
        FROM employees
        WHERE full_name IS NOT NULL AND full_name <> ''
        ORDER BY emp_code
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn export_rows(pool: &MySqlPool, month_year: &str) -> Result<Vec<ExportRow>, sqlx::Error> {
    sqlx::query_as::<_, ExportRow>(
        r#"
        SELECT e.emp_code, e.full_name, e.status_name, i.item_group, i.item_name, i.amount
        FROM salary_items i
        JOIN salary_sheets s ON s.sheet_id = i.sheet_id
        JOIN employees e ON e.employee_id = s.employee_id
        WHERE s.month_year = ?
        ORDER BY e.emp_code, i.item_id
        "#,
    )
    .bind(month_year)
    .fetch_all(pool)
    .await
}
