use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::time::Duration;

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .max_lifetime(Duration::from_secs(300))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Idempotent schema setup, run at every startup.
pub async fn run_migrations(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            employee_id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            emp_code VARCHAR(64) NOT NULL,
            full_name VARCHAR(255) NOT NULL,
            status_name VARCHAR(100) NOT NULL DEFAULT 'ปกติ',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE KEY uq_employees_code (emp_code)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salary_periods (
            month_year VARCHAR(50) NOT NULL PRIMARY KEY,
            api_is_active BOOLEAN NOT NULL DEFAULT FALSE,
            api_active_from DATETIME NULL,
            api_active_to DATETIME NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salary_sheets (
            sheet_id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            employee_id BIGINT UNSIGNED NOT NULL,
            month_year VARCHAR(50) NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
            UNIQUE KEY uq_sheets_employee_month (employee_id, month_year),
            FOREIGN KEY (employee_id) REFERENCES employees(employee_id),
            FOREIGN KEY (month_year) REFERENCES salary_periods(month_year)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salary_items (
            item_id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            sheet_id BIGINT UNSIGNED NOT NULL,
            item_group VARCHAR(64) NOT NULL,
            item_name VARCHAR(255) NOT NULL,
            amount DECIMAL(14, 2) NOT NULL DEFAULT 0,
            UNIQUE KEY uq_items_sheet_name (sheet_id, item_name),
            FOREIGN KEY (sheet_id) REFERENCES salary_sheets(sheet_id) ON DELETE CASCADE
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salary_item_meta (
            meta_id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            item_name VARCHAR(255) NOT NULL,
            item_group VARCHAR(64) NOT NULL,
            remark VARCHAR(255) NOT NULL DEFAULT '',
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
            UNIQUE KEY uq_meta_item_name (item_name)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salary_50tawi (
            id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            year VARCHAR(10) NOT NULL,
            employee_id BIGINT UNSIGNED NOT NULL,
            url_pdf VARCHAR(500) NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE KEY uq_50tawi_year_employee (year, employee_id),
            FOREIGN KEY (employee_id) REFERENCES employees(employee_id)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
