//! SQL access. Functions return `sqlx::Error`; handlers convert to `AppError`.

pub mod meta;
pub mod period;
pub mod salary;
pub mod tax_certificate;
