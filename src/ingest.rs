//! Payroll workbook parsing.
//!
//! The first worksheet carries one header row followed by one row per employee.
//! A few identity columns are recognised by name; every other non-empty column is
//! a salary line item whose group is decided later by the classifier.

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Cursor;
use std::str::FromStr;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::model::employee::DEFAULT_STATUS;
use crate::model::limits::{
    MAX_EMP_CODE_CHARS, MAX_STATUS_CHARS, MAX_TEXT_CHARS, check_amount, check_len,
};
use crate::model::salary::{SalaryItem, SalaryRecord};
use crate::utils::thai_month::normalize_month_year;

pub const COL_SHEET: &str = "Sheet";
pub const COL_EMP_CODE: &str = "รหัสพนักงาน";
pub const COL_FULL_NAME: &str = "ชื่อ-นามสกุล";
pub const COL_STATUS: &str = "สถานะคนลาออก";

/// A parsed but not yet classified upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedWorkbook {
    pub month_year: String,
    /// Line-item headers in sheet order.
    pub item_columns: Vec<String>,
    pub rows: Vec<RowRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    pub emp_code: String,
    pub full_name: String,
    pub status: String,
    pub amounts: Vec<(String, Decimal)>,
}

impl ParsedWorkbook {
    /// Attaches a group to every line item. `groups` must cover every item column.
    pub fn classify(&self, groups: &BTreeMap<String, String>) -> AppResult<Vec<SalaryRecord>> {
        let mut records = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            let mut record = SalaryRecord::new(&row.emp_code, &row.full_name, &row.status);
            for (name, amount) in &row.amounts {
                let group = groups.get(name).ok_or_else(|| {
                    AppError::Internal(format!("column `{}` was not classified", name))
                })?;
                record.set_item(SalaryItem {
                    item_group: group.clone(),
                    item_name: name.clone(),
                    amount: *amount,
                });
            }
            records.push(record);
        }

        Ok(records)
    }
}

/// Reads the first worksheet of an xlsx/xls/ods file held in memory.
pub fn parse_workbook(bytes: Vec<u8>) -> AppResult<ParsedWorkbook> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let tab_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Parse("Excel file has no sheets".to_string()))?;

    let range = workbook.worksheet_range(&tab_name)?;

    parse_range(&tab_name, &range)
}

#[derive(Default)]
struct ColumnLayout {
    sheet: Option<usize>,
    emp_code: Option<usize>,
    full_name: Option<usize>,
    status: Option<usize>,
    items: Vec<(usize, String)>,
}

pub fn parse_range(tab_name: &str, range: &Range<Data>) -> AppResult<ParsedWorkbook> {
    let mut rows = range.rows();

    let header = rows
        .next()
        .ok_or_else(|| AppError::Validation("Spreadsheet is empty".to_string()))?;

    let data: Vec<&[Data]> = rows.filter(|r| !r.iter().all(is_blank)).collect();
    if data.is_empty() {
        return Err(AppError::Validation("Spreadsheet has no data rows".to_string()));
    }

    let layout = read_layout(header, &data)?;

    let emp_idx = layout.emp_code.ok_or_else(|| {
        AppError::Validation(format!("Missing required column `{}`", COL_EMP_CODE))
    })?;

    let label = layout
        .sheet
        .and_then(|i| {
            data.iter()
                .map(|r| cell_at(r, i))
                .find(|s| !s.is_empty())
        })
        .unwrap_or_else(|| tab_name.trim().to_string());
    let month_year = normalize_month_year(&label)?;

    let mut records: Vec<RowRecord> = Vec::with_capacity(data.len());
    let mut by_code: HashMap<String, usize> = HashMap::new();
    for row in &data {
        let emp_code = cell_at(row, emp_idx);
        if is_missing_code(&emp_code) {
            continue;
        }
        check_len(COL_EMP_CODE, &emp_code, MAX_EMP_CODE_CHARS)?;

        let full_name = layout
            .full_name
            .map(|i| cell_at(row, i))
            .unwrap_or_default();
        let status = layout
            .status
            .map(|i| cell_at(row, i))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());

        check_len(COL_FULL_NAME, &full_name, MAX_TEXT_CHARS)?;
        check_len(COL_STATUS, &status, MAX_STATUS_CHARS)?;

        let amounts: Vec<(String, Decimal)> = layout
            .items
            .iter()
            .filter_map(|(i, name)| {
                row.get(*i)
                    .and_then(cell_amount)
                    .map(|amount| (name.clone(), amount))
            })
            .collect();
        for (name, amount) in &amounts {
            check_amount(name, *amount)?;
        }

        let record = RowRecord {
            emp_code,
            full_name,
            status,
            amounts,
        };

        // Later rows for the same code replace earlier ones, keeping first-seen order.
        match by_code.get(&record.emp_code) {
            Some(&idx) => {
                debug!(emp_code = %record.emp_code, "Duplicate employee code, later row wins");
                records[idx] = record;
            }
            None => {
                by_code.insert(record.emp_code.clone(), records.len());
                records.push(record);
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::Validation(format!(
            "No rows with a value in `{}`",
            COL_EMP_CODE
        )));
    }

    Ok(ParsedWorkbook {
        month_year,
        item_columns: layout.items.into_iter().map(|(_, name)| name).collect(),
        rows: records,
    })
}

fn read_layout(header: &[Data], data: &[&[Data]]) -> AppResult<ColumnLayout> {
    let mut layout = ColumnLayout::default();
    let mut seen = HashSet::new();

    for (idx, cell) in header.iter().enumerate() {
        let name = cell_text(cell);
        let has_values = data
            .iter()
            .any(|r| r.get(idx).is_some_and(|c| !is_blank(c)));

        if name.is_empty() {
            if has_values {
                return Err(AppError::Parse(format!(
                    "Column {} has values but no header",
                    column_letter(idx)
                )));
            }
            continue;
        }

        let key = compact(&name);
        let identity = [COL_SHEET, COL_EMP_CODE, COL_FULL_NAME, COL_STATUS]
            .iter()
            .any(|col| key == compact(col));

        // Identity headers collide regardless of spacing; item headers must match exactly.
        let dedupe_key = if identity { key.clone() } else { name.clone() };
        if !seen.insert(dedupe_key) {
            return Err(AppError::Parse(format!("Duplicate column `{}`", name)));
        }

        if key == compact(COL_SHEET) {
            layout.sheet = Some(idx);
        } else if key == compact(COL_EMP_CODE) {
            layout.emp_code = Some(idx);
        } else if key == compact(COL_FULL_NAME) {
            layout.full_name = Some(idx);
        } else if key == compact(COL_STATUS) {
            layout.status = Some(idx);
        } else if has_values {
            check_len("Column header", &name, MAX_TEXT_CHARS)?;
            layout.items.push((idx, name));
        } else {
            debug!(column = %name, "Dropping empty column");
        }
    }

    Ok(layout)
}

fn compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn is_missing_code(code: &str) -> bool {
    code.is_empty() || code.eq_ignore_ascii_case("nan") || code.eq_ignore_ascii_case("none")
}

fn cell_at(row: &[Data], idx: usize) -> String {
    row.get(idx).map(cell_text).unwrap_or_default()
}

/// Text form of a cell. Whole floats lose their `.0` so numeric employee codes read naturally.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_amount(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Float(f) => Decimal::from_f64(*f).map(|d| d.round_dp(2)),
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::String(s) => parse_amount(s),
        _ => None,
    }
}

/// Parses `1,234.50`-style text. Placeholders such as `-` yield `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok().map(|d| d.round_dp(2))
}

fn column_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    enum Cell<'a> {
        S(&'a str),
        N(f64),
        E,
    }
    use Cell::{E, N, S};

    fn xlsx(tab: &str, header: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(tab).unwrap();

        for (c, h) in header.iter().enumerate() {
            if !h.is_empty() {
                sheet.write_string(0, c as u16, *h).unwrap();
            }
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = ((r + 1) as u32, c as u16);
                match cell {
                    S(s) => {
                        sheet.write_string(r, c, *s).unwrap();
                    }
                    N(n) => {
                        sheet.write_number(r, c, *n).unwrap();
                    }
                    E => {}
                }
            }
        }

        workbook.save_to_buffer().unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const HEADER: [&str; 6] = [
        "Sheet",
        "รหัสพนักงาน",
        "ชื่อ-นามสกุล",
        "สถานะคนลาออก",
        "เงินเดือน",
        "ประกันสังคม",
    ];

    #[test]
    fn parses_identity_amounts_and_period() {
        let bytes = xlsx(
            "Sheet1",
            &HEADER,
            &[
                vec![S("พ.ย.2568"), S("1001"), S("สมชาย ใจดี"), S("ปกติ"), N(30000.0), N(750.0)],
                vec![S("พ.ย.2568"), S("1002"), S("สมหญิง รักงาน"), S("ลาออก"), N(25000.5), E],
            ],
        );

        let parsed = parse_workbook(bytes).unwrap();

        assert_eq!(parsed.month_year, "November2025");
        assert_eq!(parsed.item_columns, vec!["เงินเดือน", "ประกันสังคม"]);
        assert_eq!(parsed.rows.len(), 2);

        let first = &parsed.rows[0];
        assert_eq!(first.emp_code, "1001");
        assert_eq!(first.full_name, "สมชาย ใจดี");
        assert_eq!(
            first.amounts,
            vec![
                ("เงินเดือน".to_string(), dec("30000")),
                ("ประกันสังคม".to_string(), dec("750")),
            ]
        );

        let second = &parsed.rows[1];
        assert_eq!(second.status, "ลาออก");
        assert_eq!(second.amounts, vec![("เงินเดือน".to_string(), dec("25000.50"))]);
    }

    #[test]
    fn missing_employee_code_column_is_validation_error() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "ชื่อ-นามสกุล", "เงินเดือน"],
            &[vec![S("พ.ย.2568"), S("สมชาย"), N(100.0)]],
        );

        let err = parse_workbook(bytes).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains(COL_EMP_CODE)));
    }

    #[test]
    fn unrecognised_month_is_parse_error() {
        let bytes = xlsx(
            "Sheet1",
            &HEADER,
            &[vec![S("Nov 68"), S("1001"), S("สมชาย"), S("ปกติ"), N(1.0), N(1.0)]],
        );

        assert!(matches!(parse_workbook(bytes), Err(AppError::Parse(_))));
    }

    #[test]
    fn numeric_codes_and_default_status() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", "ชื่อ-นามสกุล", "เงินเดือน"],
            &[vec![S("ธ.ค.2568"), N(1001.0), S("สมชาย"), N(100.0)]],
        );

        let parsed = parse_workbook(bytes).unwrap();
        assert_eq!(parsed.month_year, "December2025");
        assert_eq!(parsed.rows[0].emp_code, "1001");
        assert_eq!(parsed.rows[0].status, DEFAULT_STATUS);
    }

    #[test]
    fn rows_without_code_are_skipped() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", "เงินเดือน"],
            &[
                vec![S("ม.ค.2569"), S("1001"), N(100.0)],
                vec![S("ม.ค.2569"), E, N(100.0)],
                vec![S("ม.ค.2569"), S("nan"), N(100.0)],
            ],
        );

        let parsed = parse_workbook(bytes).unwrap();
        assert_eq!(parsed.rows.len(), 1);
    }

    #[test]
    fn spaced_identity_headers_match() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet ", "รหัสพนักงาน", "ชื่อ - นามสกุล", "เงินเดือน"],
            &[vec![S("พ.ย.2568"), S("1001"), S("สมชาย"), N(100.0)]],
        );

        let parsed = parse_workbook(bytes).unwrap();
        assert_eq!(parsed.rows[0].full_name, "สมชาย");
        assert_eq!(parsed.item_columns, vec!["เงินเดือน"]);
    }

    #[test]
    fn empty_columns_are_dropped() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", "ค่าว่าง", "", "เงินเดือน"],
            &[vec![S("พ.ย.2568"), S("1001"), E, E, N(100.0)]],
        );

        let parsed = parse_workbook(bytes).unwrap();
        assert_eq!(parsed.item_columns, vec!["เงินเดือน"]);
    }

    #[test]
    fn headerless_values_are_rejected() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", ""],
            &[vec![S("พ.ย.2568"), S("1001"), N(5.0)]],
        );

        let err = parse_workbook(bytes).unwrap_err();
        assert!(matches!(err, AppError::Parse(ref m) if m.contains("Column C")));
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", "โบนัส", "โบนัส"],
            &[vec![S("พ.ย.2568"), S("1001"), N(1.0), N(2.0)]],
        );

        assert!(matches!(parse_workbook(bytes), Err(AppError::Parse(_))));
    }

    #[test]
    fn spaced_duplicate_identity_headers_are_rejected() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", "ชื่อ-นามสกุล", "ชื่อ - นามสกุล", "เงินเดือน"],
            &[vec![S("พ.ย.2568"), S("1001"), S("ก"), S("ข"), N(1.0)]],
        );

        assert!(matches!(parse_workbook(bytes), Err(AppError::Parse(_))));
    }

    #[test]
    fn repeated_employee_code_keeps_the_later_row() {
        let bytes = xlsx(
            "Sheet1",
            &HEADER,
            &[
                vec![S("พ.ย.2568"), S("1001"), S("เก่า"), S("ปกติ"), N(100.0), N(5.0)],
                vec![S("พ.ย.2568"), S("1002"), S("อื่น"), S("ปกติ"), N(200.0), E],
                vec![S("พ.ย.2568"), S("1001"), S("ใหม่"), S("ลาออก"), N(300.0), E],
            ],
        );

        let parsed = parse_workbook(bytes).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].emp_code, "1001");
        assert_eq!(parsed.rows[0].full_name, "ใหม่");
        assert_eq!(parsed.rows[0].status, "ลาออก");
        assert_eq!(
            parsed.rows[0].amounts,
            vec![("เงินเดือน".to_string(), dec("300"))]
        );
        assert_eq!(parsed.rows[1].emp_code, "1002");
    }

    #[test]
    fn amount_beyond_column_precision_is_validation_error() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", "เงินเดือน"],
            &[vec![S("พ.ย.2568"), S("1001"), N(1e15)]],
        );

        assert!(matches!(parse_workbook(bytes), Err(AppError::Validation(_))));
    }

    #[test]
    fn oversized_identity_and_headers_are_validation_errors() {
        let long_code = "9".repeat(65);
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", "เงินเดือน"],
            &[vec![S("พ.ย.2568"), S(&long_code), N(1.0)]],
        );
        assert!(matches!(parse_workbook(bytes), Err(AppError::Validation(_))));

        let long_name = "ก".repeat(256);
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", "ชื่อ-นามสกุล", "เงินเดือน"],
            &[vec![S("พ.ย.2568"), S("1001"), S(&long_name), N(1.0)]],
        );
        assert!(matches!(parse_workbook(bytes), Err(AppError::Validation(_))));

        let long_header = "ค".repeat(256);
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", long_header.as_str()],
            &[vec![S("พ.ย.2568"), S("1001"), N(1.0)]],
        );
        assert!(matches!(parse_workbook(bytes), Err(AppError::Validation(_))));
    }

    #[test]
    fn tab_name_is_used_without_sheet_column() {
        let bytes = xlsx(
            "ต.ค.2568",
            &["รหัสพนักงาน", "เงินเดือน"],
            &[vec![S("1001"), N(100.0)]],
        );

        assert_eq!(parse_workbook(bytes).unwrap().month_year, "October2025");
    }

    #[test]
    fn text_amounts_with_separators() {
        let bytes = xlsx(
            "Sheet1",
            &["Sheet", "รหัสพนักงาน", "เงินเดือน", "หมายเหตุ"],
            &[vec![S("พ.ย.2568"), S("1001"), S("32,500.75"), S("-")]],
        );

        let parsed = parse_workbook(bytes).unwrap();
        assert_eq!(
            parsed.rows[0].amounts,
            vec![("เงินเดือน".to_string(), dec("32500.75"))]
        );
    }

    #[test]
    fn only_header_is_validation_error() {
        let bytes = xlsx("Sheet1", &HEADER, &[]);
        assert!(matches!(parse_workbook(bytes), Err(AppError::Validation(_))));
    }

    #[test]
    fn garbage_bytes_are_parse_error() {
        let err = parse_workbook(b"not a spreadsheet".to_vec()).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn classify_nests_items_by_group() {
        let parsed = ParsedWorkbook {
            month_year: "November2025".to_string(),
            item_columns: vec!["โบนัส".to_string(), "ภาษี".to_string()],
            rows: vec![RowRecord {
                emp_code: "1001".to_string(),
                full_name: "สมชาย".to_string(),
                status: DEFAULT_STATUS.to_string(),
                amounts: vec![
                    ("โบนัส".to_string(), dec("500")),
                    ("ภาษี".to_string(), dec("25")),
                ],
            }],
        };
        let groups = BTreeMap::from([
            ("โบนัส".to_string(), "earnings".to_string()),
            ("ภาษี".to_string(), "deductions".to_string()),
        ]);

        let records = parsed.classify(&groups).unwrap();

        assert_eq!(records[0].items[0].item_group, "earnings");
        assert_eq!(records[0].items[1].item_group, "deductions");
    }

    #[test]
    fn classify_requires_every_column() {
        let parsed = ParsedWorkbook {
            month_year: "November2025".to_string(),
            item_columns: vec!["โบนัส".to_string()],
            rows: vec![RowRecord {
                emp_code: "1001".to_string(),
                full_name: String::new(),
                status: DEFAULT_STATUS.to_string(),
                amounts: vec![("โบนัส".to_string(), dec("1"))],
            }],
        };

        assert!(parsed.classify(&BTreeMap::new()).is_err());
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }
}
