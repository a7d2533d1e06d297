use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::model::item_meta::{DeleteItemMeta, SalaryItemMetaResponse, UpsertItemMeta};
use crate::model::limits::{MAX_TEXT_CHARS, check_len};
use crate::store;
use crate::utils::item_classifier::ItemClassifier;

/// List salary item metadata
#[utoipa::path(
    get,
    path = "/salary_items/meta",
    responses(
        (status = 200, description = "All entries ordered by item name", body = [SalaryItemMetaResponse])
    ),
    tag = "Salary item metadata"
)]
pub async fn list_item_meta(pool: web::Data<MySqlPool>) -> AppResult<HttpResponse> {
    let entries: Vec<SalaryItemMetaResponse> = store::meta::list(pool.get_ref())
        .await?
        .into_iter()
        .map(SalaryItemMetaResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(entries))
}

/// Create or update the group of a salary item
#[utoipa::path(
    post,
    path = "/salary_items/meta",
    request_body = UpsertItemMeta,
    responses(
        (status = 201, description = "Entry stored", body = Object, example = json!({
            "status": "updated",
            "item_name": "โบนัส",
            "item_group": "earnings"
        })),
        (status = 400, description = "Missing name or unknown group")
    ),
    tag = "Salary item metadata"
)]
pub async fn upsert_item_meta(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    classifier: web::Data<ItemClassifier>,
    payload: web::Json<UpsertItemMeta>,
) -> AppResult<HttpResponse> {
    let (item_name, item_group) = validate_upsert(&config, &payload)?;
    let remark = payload.remark.as_deref().unwrap_or("").trim();

    store::meta::upsert(pool.get_ref(), &item_name, &item_group, remark).await?;
    classifier.invalidate(&item_name).await;

    info!(item_name = %item_name, item_group = %item_group, "Salary item metadata stored");

    Ok(HttpResponse::Created().json(json!({
        "status": "updated",
        "item_name": item_name,
        "item_group": item_group
    })))
}

/// Delete a salary item metadata entry
#[utoipa::path(
    delete,
    path = "/salary_items/meta",
    request_body = DeleteItemMeta,
    responses(
        (status = 200, description = "Entry deleted", body = Object, example = json!({
            "status": "deleted",
            "item_name": "โบนัส"
        })),
        (status = 400, description = "item_name missing"),
        (status = 404, description = "No entry with that name")
    ),
    tag = "Salary item metadata"
)]
pub async fn delete_item_meta(
    pool: web::Data<MySqlPool>,
    classifier: web::Data<ItemClassifier>,
    payload: web::Json<DeleteItemMeta>,
) -> AppResult<HttpResponse> {
    let item_name = payload
        .item_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("item_name required".to_string()))?;

    let removed = store::meta::delete(pool.get_ref(), item_name).await?;
    classifier.invalidate(item_name).await;

    if removed == 0 {
        return Err(AppError::NotFound(format!(
            "No salary item metadata for `{}`",
            item_name
        )));
    }

    info!(item_name = %item_name, "Salary item metadata deleted");

    Ok(HttpResponse::Ok().json(json!({
        "status": "deleted",
        "item_name": item_name
    })))
}

/// Drop every cached item classification
///
/// For edits made to `salary_item_meta` outside this service.
#[utoipa::path(
    delete,
    path = "/salary_items/meta/cache",
    responses(
        (status = 200, description = "Cache cleared", body = Object, example = json!({
            "status": "cleared"
        }))
    ),
    tag = "Salary item metadata"
)]
pub async fn clear_item_meta_cache(
    classifier: web::Data<ItemClassifier>,
) -> AppResult<HttpResponse> {
    classifier.invalidate_all();
    info!("Salary item classification cache cleared");

    Ok(HttpResponse::Ok().json(json!({ "status": "cleared" })))
}

fn validate_upsert(config: &Config, payload: &UpsertItemMeta) -> AppResult<(String, String)> {
    let name = payload.item_name.as_deref().map(str::trim).unwrap_or("");
    let group = payload.item_group.as_deref().map(str::trim).unwrap_or("");

    if name.is_empty() || group.is_empty() {
        return Err(AppError::Validation(
            "item_name and item_group required".to_string(),
        ));
    }
    if !config.is_known_group(group) {
        return Err(AppError::Validation(format!(
            "Unknown item group `{}`, expected one of: {}",
            group,
            config.item_groups.join(", ")
        )));
    }

    check_len("item_name", name, MAX_TEXT_CHARS)?;
    check_len("remark", payload.remark.as_deref().unwrap_or("").trim(), MAX_TEXT_CHARS)?;

    Ok((name.to_string(), group.to_string()))
}
