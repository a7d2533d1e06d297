//! Thai Buddhist-calendar month labels (`พ.ย.2568`) to month-year tokens (`November2025`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

const BUDDHIST_ERA_OFFSET: i32 = 543;

const THAI_MONTHS: [(&str, &str); 12] = [
    ("ม.ค.", "January"),
    ("ก.พ.", "February"),
    ("มี.ค.", "March"),
    ("เม.ย.", "April"),
    ("พ.ค.", "May"),
    ("มิ.ย.", "June"),
    ("ก.ค.", "July"),
    ("ส.ค.", "August"),
    ("ก.ย.", "September"),
    ("ต.ค.", "October"),
    ("พ.ย.", "November"),
    ("ธ.ค.", "December"),
];

static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\D+)(\d{4})$").expect("month label pattern compiles"));

/// Converts a Thai month label such as `พ.ย.2568` (whitespace ignored) to `November2025`.
pub fn thai_label_to_month_year(label: &str) -> AppResult<String> {
    let compact: String = label.chars().filter(|c| !c.is_whitespace()).collect();

    let caps = LABEL_RE
        .captures(&compact)
        .ok_or_else(|| unrecognised(label))?;

    let month = THAI_MONTHS
        .iter()
        .find(|(thai, _)| *thai == &caps[1])
        .map(|(_, english)| *english)
        .ok_or_else(|| unrecognised(label))?;

    let buddhist_year: i32 = caps[2].parse().map_err(|_| unrecognised(label))?;
    let year = buddhist_year - BUDDHIST_ERA_OFFSET;
    if year <= 0 {
        return Err(unrecognised(label));
    }

    Ok(format!("{}{}", month, year))
}

/// Accepts either a canonical token (`November2025`) or a Thai label and returns the token.
pub fn normalize_month_year(value: &str) -> AppResult<String> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(caps) = LABEL_RE.captures(&compact) {
        if THAI_MONTHS.iter().any(|(_, english)| *english == &caps[1]) {
            return Ok(compact);
        }
    }

    thai_label_to_month_year(value)
}

/// `(year, month)` for a canonical token, used to order periods chronologically.
pub fn month_year_sort_key(token: &str) -> Option<(i32, u32)> {
    let caps = LABEL_RE.captures(token)?;
    let month = THAI_MONTHS
        .iter()
        .position(|(_, english)| *english == &caps[1])?;
    let year = caps[2].parse().ok()?;
    Some((year, month as u32 + 1))
}

fn unrecognised(label: &str) -> AppError {
    AppError::Parse(format!(
        "Unrecognised month label `{}`; expected e.g. `พ.ย.2568`",
        label
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_november_2568() {
        assert_eq!(thai_label_to_month_year("พ.ย.2568").unwrap(), "November2025");
    }

    #[test]
    fn ignores_whitespace() {
        assert_eq!(thai_label_to_month_year(" ม.ค. 2569 ").unwrap(), "January2026");
    }

    #[test]
    fn every_month_maps() {
        for (i, (thai, english)) in THAI_MONTHS.iter().enumerate() {
            let token = thai_label_to_month_year(&format!("{}2568", thai)).unwrap();
            assert_eq!(token, format!("{}2025", english), "month #{}", i + 1);
        }
    }

    #[test]
    fn rejects_unknown_prefix() {
        assert!(matches!(thai_label_to_month_year("พย2568"), Err(AppError::Parse(_))));
        assert!(matches!(thai_label_to_month_year("Nov2568"), Err(AppError::Parse(_))));
    }

    #[test]
    fn rejects_bad_year() {
        assert!(thai_label_to_month_year("พ.ย.68").is_err());
        assert!(thai_label_to_month_year("พ.ย.25688").is_err());
        assert!(thai_label_to_month_year("พ.ย.0100").is_err());
    }

    #[test]
    fn rejects_empty_and_noise() {
        for label in ["", "2568", "พ.ย.", "Unknown", "พ.ย.2568x"] {
            assert!(thai_label_to_month_year(label).is_err(), "{:?}", label);
        }
    }

    #[test]
    fn normalize_accepts_token_and_label() {
        assert_eq!(normalize_month_year("November2025").unwrap(), "November2025");
        assert_eq!(normalize_month_year("พ.ย.2568").unwrap(), "November2025");
        assert!(normalize_month_year("Novembre2025").is_err());
    }

    #[test]
    fn sort_key_orders_chronologically() {
        let mut tokens = vec!["September2025", "January2026", "November2025"];
        tokens.sort_by_key(|t| std::cmp::Reverse(month_year_sort_key(t)));
        assert_eq!(tokens, vec!["January2026", "November2025", "September2025"]);
        assert_eq!(month_year_sort_key("garbage"), None);
    }
}
