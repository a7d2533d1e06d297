use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// group tag -> item name -> amount rendered with two decimals
pub type Datalist = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SalaryItem {
    pub item_group: String,
    pub item_name: String,
    pub amount: Decimal,
}

/// One employee's classified line items for a single period, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRecord {
    pub emp_code: String,
    pub full_name: String,
    pub status: String,
    pub items: Vec<SalaryItem>,
}

impl SalaryRecord {
    pub fn new(emp_code: impl Into<String>, full_name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            emp_code: emp_code.into(),
            full_name: full_name.into(),
            status: status.into(),
            items: Vec::new(),
        }
    }

    /// Adds an item, replacing any earlier item with the same name.
    pub fn set_item(&mut self, item: SalaryItem) {
        match self.items.iter_mut().find(|i| i.item_name == item.item_name) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }
}

/// Sheet row joined with its employee.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SheetView {
    pub sheet_id: u64,
    pub month_year: String,
    pub emp_code: String,
    pub full_name: String,
    pub status_name: String,
}

/// Flat row used by the period export.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExportRow {
    pub emp_code: String,
    pub full_name: String,
    pub status_name: String,
    pub item_group: String,
    pub item_name: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "Sheet": "November2025",
    "รหัสพนักงาน": "1001",
    "ชื่อ - นามสกุล": "สมชาย ใจดี",
    "สถานะคนลาออก": "ปกติ",
    "datalist": {
        "earnings": { "เงินเดือน": "30000.00" },
        "deductions": { "ประกันสังคม": "750.00" },
        "summary": { "รับสุทธิ": "29250.00" }
    }
}))]
pub struct SalaryDataResponse {
    #[serde(rename = "Sheet")]
    pub sheet: String,

    #[serde(rename = "รหัสพนักงาน")]
    pub emp_code: String,

    #[serde(rename = "ชื่อ - นามสกุล")]
    pub full_name: String,

    #[serde(rename = "สถานะคนลาออก")]
    pub status: String,

    #[schema(value_type = Object)]
    pub datalist: Datalist,
}

pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Nests items under their group. Every configured group is present even when empty.
pub fn to_datalist(groups: &[String], items: &[SalaryItem]) -> Datalist {
    let mut datalist: Datalist = groups
        .iter()
        .map(|g| (g.clone(), BTreeMap::new()))
        .collect();

    for item in items {
        datalist
            .entry(item.item_group.clone())
            .or_default()
            .insert(item.item_name.clone(), format_amount(item.amount));
    }

    datalist
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(group: &str, name: &str, amount: &str) -> SalaryItem {
        SalaryItem {
            item_group: group.to_string(),
            item_name: name.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
        }
    }

    #[test]
    fn datalist_seeds_every_group() {
        let groups = vec!["earnings".to_string(), "deductions".to_string(), "summary".to_string()];
        let datalist = to_datalist(&groups, &[item("earnings", "เงินเดือน", "30000")]);

        assert_eq!(datalist.len(), 3);
        assert_eq!(datalist["earnings"]["เงินเดือน"], "30000.00");
        assert!(datalist["deductions"].is_empty());
    }

    #[test]
    fn datalist_keeps_groups_outside_configuration() {
        let groups = vec!["earnings".to_string()];
        let datalist = to_datalist(&groups, &[item("legacy", "ค่าเดินทาง", "120.5")]);
        assert_eq!(datalist["legacy"]["ค่าเดินทาง"], "120.50");
    }

    #[test]
    fn format_amount_rounds_to_cents() {
        assert_eq!(format_amount(Decimal::from_str("1234.567").unwrap()), "1234.57");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn set_item_replaces_by_name() {
        let mut record = SalaryRecord::new("1001", "สมชาย", "ปกติ");
        record.set_item(item("earnings", "โบนัส", "100"));
        record.set_item(item("summary", "โบนัส", "200"));

        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].item_group, "summary");
    }
}
