pub mod export;
pub mod health;
pub mod item_meta;
pub mod lookups;
pub mod period_window;
pub mod salary_data;
pub mod tax_certificate;
pub mod upload;
