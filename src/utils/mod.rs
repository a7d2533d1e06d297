pub mod item_classifier;
pub mod thai_month;
pub mod time;
