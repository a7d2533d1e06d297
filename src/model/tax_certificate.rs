use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Withholding-tax certificate (50 ทวิ) link for one employee and year.
#[derive(Debug, sqlx::FromRow)]
pub struct TaxCertificate {
    pub year: String,
    pub url_pdf: Option<String>,
    pub emp_code: String,
    pub full_name: String,
    pub status_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaxCertificateResponse {
    #[serde(rename = "Sheet")]
    #[schema(example = "2568")]
    pub year: String,
    pub url_pdf: Option<String>,
    #[serde(rename = "ชื่อ - นามสกุล")]
    pub full_name: String,
    #[serde(rename = "รหัสพนักงาน")]
    pub emp_code: String,
    #[serde(rename = "สถานะคนลาออก")]
    pub status: String,
}

impl From<TaxCertificate> for TaxCertificateResponse {
    fn from(c: TaxCertificate) -> Self {
        Self {
            year: c.year,
            url_pdf: c.url_pdf,
            full_name: c.full_name,
            emp_code: c.emp_code,
            status: c.status_name,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertTaxCertificate {
    #[schema(example = "2568")]
    pub year: Option<String>,
    #[schema(example = "1001")]
    pub emp_id: Option<String>,
    #[schema(example = "https://files.example.com/50tawi/2568/1001.pdf")]
    pub url_pdf: Option<String>,
}
