//! Column widths of the schema created in `db.rs`, checked before anything is written.

use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};

pub const MAX_EMP_CODE_CHARS: usize = 64;
pub const MAX_STATUS_CHARS: usize = 100;
/// `full_name`, `item_name` and `remark`
pub const MAX_TEXT_CHARS: usize = 255;
pub const MAX_YEAR_CHARS: usize = 10;
pub const MAX_URL_CHARS: usize = 500;

/// Largest magnitude a `DECIMAL(14, 2)` column holds.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// VARCHAR widths count characters, not bytes.
pub fn check_len(field: &str, value: &str, max_chars: usize) -> AppResult<()> {
    let chars = value.chars().count();
    if chars > max_chars {
        return Err(AppError::Validation(format!(
            "{} is {} characters long, the limit is {}",
            field, chars, max_chars
        )));
    }
    Ok(())
}

pub fn check_amount(item_name: &str, amount: Decimal) -> AppResult<()> {
    if amount.abs() > max_amount() {
        return Err(AppError::Validation(format!(
            "Amount {} for `{}` exceeds {}",
            amount,
            item_name,
            max_amount()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn length_counts_thai_characters_not_bytes() {
        let name = "ก".repeat(MAX_TEXT_CHARS);
        assert!(name.len() > MAX_TEXT_CHARS);
        assert!(check_len("full_name", &name, MAX_TEXT_CHARS).is_ok());

        let err = check_len("full_name", &format!("{}ข", name), MAX_TEXT_CHARS).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn amount_bounds_match_decimal_14_2() {
        assert!(check_amount("เงินเดือน", Decimal::from_str("999999999999.99").unwrap()).is_ok());
        assert!(check_amount("เงินคืน", Decimal::from_str("-999999999999.99").unwrap()).is_ok());
        assert!(check_amount("เงินเดือน", Decimal::from_str("1000000000000").unwrap()).is_err());
        assert!(check_amount("เงินเดือน", Decimal::from_str("1000000000000000").unwrap()).is_err());
    }
}
