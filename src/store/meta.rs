use sqlx::MySqlPool;

use crate::model::item_meta::SalaryItemMeta;

pub async fn find_group(pool: &MySqlPool, item_name: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT item_group FROM salary_item_meta WHERE item_name = ?")
        .bind(item_name)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &MySqlPool) -> Result<Vec<SalaryItemMeta>, sqlx::Error> {
    sqlx::query_as::<_, SalaryItemMeta>(
        r#"
        SELECT meta_id, item_name, item_group, remark, updated_at
        FROM salary_item_meta
        ORDER BY item_name ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn upsert(
    pool: &MySqlPool,
    item_name: &str,
    item_group: &str,
    remark: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO salary_item_meta (item_name, item_group, remark)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE item_group = ?, remark = ?
        "#,
    )
    .bind(item_name)
    .bind(item_group)
    .bind(remark)
    .bind(item_group)
    .bind(remark)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete(pool: &MySqlPool, item_name: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM salary_item_meta WHERE item_name = ?")
        .bind(item_name)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
