pub mod employee;
pub mod item_meta;
pub mod limits;
pub mod period;
pub mod salary;
pub mod tax_certificate;
