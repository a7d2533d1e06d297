//! Period export: one row per employee, one column per salary item.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use std::collections::HashMap;
use unicode_width::UnicodeWidthStr;

use crate::model::salary::ExportRow;

pub const IDENTITY_HEADERS: [&str; 3] = ["รหัสพนักงาน", "ชื่อ - นามสกุล", "สถานะ"];
pub const NET_PAY: &str = "Net Pay";
pub const SHEET_NAME: &str = "Payroll";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const EARNINGS: &str = "earnings";
const DEDUCTIONS: &str = "deductions";

#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    /// Identity headers, item columns, per-group totals, then `Net Pay`.
    pub headers: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub emp_code: String,
    pub full_name: String,
    pub status: String,
    /// Aligned with `headers` after the identity columns.
    pub values: Vec<Decimal>,
}

pub fn build_pivot(rows: &[ExportRow], groups: &[String]) -> Pivot {
    let mut items: Vec<(String, String)> = Vec::new();
    let mut item_idx: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        if !item_idx.contains_key(row.item_name.as_str()) {
            item_idx.insert(row.item_name.as_str(), items.len());
            items.push((row.item_name.clone(), row.item_group.clone()));
        }
    }

    let mut totals: Vec<String> = groups.to_vec();
    for (_, group) in &items {
        if !totals.contains(group) {
            totals.push(group.clone());
        }
    }

    let mut pivot_rows: Vec<PivotRow> = Vec::new();
    let mut employee_idx: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let idx = *employee_idx.entry(row.emp_code.as_str()).or_insert_with(|| {
            pivot_rows.push(PivotRow {
                emp_code: row.emp_code.clone(),
                full_name: row.full_name.clone(),
                status: row.status_name.clone(),
                values: vec![Decimal::ZERO; items.len()],
            });
            pivot_rows.len() - 1
        });
        pivot_rows[idx].values[item_idx[row.item_name.as_str()]] += row.amount;
    }

    for pivot_row in &mut pivot_rows {
        let mut group_totals = vec![Decimal::ZERO; totals.len()];
        for (value, (_, group)) in pivot_row.values.iter().zip(&items) {
            if let Some(t) = totals.iter().position(|g| g == group) {
                group_totals[t] += *value;
            }
        }

        let total_of = |name: &str| {
            totals
                .iter()
                .position(|g| g.as_str() == name)
                .map(|t| group_totals[t])
                .unwrap_or(Decimal::ZERO)
        };
        let net_pay = total_of(EARNINGS) - total_of(DEDUCTIONS);

        pivot_row.values.extend(group_totals.iter().copied());
        pivot_row.values.push(net_pay);
    }

    let headers = IDENTITY_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(items.into_iter().map(|(name, _)| name))
        .chain(totals.iter().map(|g| format!("Total {}", title_case(g))))
        .chain(std::iter::once(NET_PAY.to_string()))
        .collect();

    Pivot {
        headers,
        rows: pivot_rows,
    }
}

pub fn write_xlsx(pivot: &Pivot) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let amount_format = Format::new()
        .set_num_format("#,##0.00")
        .set_border(FormatBorder::Thin);
    let text_format = Format::new().set_border(FormatBorder::Thin);

    let mut widths: Vec<usize> = pivot.headers.iter().map(|h| h.width()).collect();

    for (col, header) in pivot.headers.iter().enumerate() {
        worksheet.write_with_format(0, col as u16, header.as_str(), &header_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (r, row) in pivot.rows.iter().enumerate() {
        let r = (r + 1) as u32;

        for (col, text) in [&row.emp_code, &row.full_name, &row.status].into_iter().enumerate() {
            worksheet.write_with_format(r, col as u16, text.as_str(), &text_format)?;
            widths[col] = widths[col].max(text.width());
        }

        for (i, value) in row.values.iter().enumerate() {
            let col = IDENTITY_HEADERS.len() + i;
            let number = value.round_dp(2).to_f64().unwrap_or_default();
            worksheet.write_with_format(r, col as u16, number, &amount_format)?;
            widths[col] = widths[col].max(format!("{:.2}", value.round_dp(2)).len());
        }
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, (*width + 5) as f64)?;
    }

    workbook.save_to_buffer()
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
