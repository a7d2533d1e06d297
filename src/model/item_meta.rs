use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, sqlx::FromRow)]
pub struct SalaryItemMeta {
    pub meta_id: u64,
    pub item_name: String,
    pub item_group: String,
    pub remark: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalaryItemMetaResponse {
    #[schema(example = 1)]
    pub meta_id: u64,
    #[schema(example = "โบนัส")]
    pub item_name: String,
    #[schema(example = "earnings")]
    pub item_group: String,
    #[schema(example = "")]
    pub remark: String,
    #[schema(example = "2025-11-30 09:00:00")]
    pub updated_at: String,
}

impl From<SalaryItemMeta> for SalaryItemMetaResponse {
    fn from(m: SalaryItemMeta) -> Self {
        Self {
            meta_id: m.meta_id,
            item_name: m.item_name,
            item_group: m.item_group,
            remark: m.remark,
            updated_at: m.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertItemMeta {
    #[schema(example = "โบนัส")]
    pub item_name: Option<String>,
    #[schema(example = "earnings")]
    pub item_group: Option<String>,
    #[schema(example = "")]
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteItemMeta {
    #[schema(example = "โบนัส")]
    pub item_name: Option<String>,
}
