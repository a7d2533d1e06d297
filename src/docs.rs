use crate::api::lookups::{EmployeeListResponse, MonthYearListResponse};
use crate::api::period_window::ApiWindowPatch;
use crate::api::salary_data::{SalaryDataPayload, SalaryDataQuery};
use crate::api::upload::{UploadForm, UploadResponse};
use crate::model::employee::{Employee, EmployeeSummary};
use crate::model::item_meta::{DeleteItemMeta, SalaryItemMetaResponse, UpsertItemMeta};
use crate::model::period::PeriodWindowResponse;
use crate::model::salary::SalaryDataResponse;
use crate::model::tax_certificate::{TaxCertificateResponse, UpsertTaxCertificate};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Sheets API",
        version = "0.1.0",
        description = r#"
## Payroll spreadsheet service

Ingests monthly payroll workbooks and serves the resulting salary records.

### Workflow
- **Metadata**: register every salary item name with its group (`earnings`, `deductions`, `summary`, ...)
- **Upload**: `POST /upload_excel` with a workbook whose tab or `Sheet` column carries a Thai month label such as `พ.ย.2568`
- **Publish**: open the period with `PATCH /salary_sheets/api-window` (Asia/Bangkok time)
- **Read**: `GET /salary_data/data?month-year=November2025&emp_id=1001`

### Errors
Every error body carries an `error` message. Uploads with unregistered item
columns list them under `unknown_columns`; nothing is stored in that case.
"#,
    ),
    paths(
        crate::api::health::healthz,

        crate::api::upload::upload_excel,

        crate::api::salary_data::get_salary_data,
        crate::api::salary_data::upsert_salary_data,
        crate::api::export::export_period,

        crate::api::item_meta::list_item_meta,
        crate::api::item_meta::upsert_item_meta,
        crate::api::item_meta::delete_item_meta,
        crate::api::item_meta::clear_item_meta_cache,

        crate::api::period_window::list_windows,
        crate::api::period_window::patch_window,

        crate::api::tax_certificate::get_certificate,
        crate::api::tax_certificate::upsert_certificate,

        crate::api::lookups::list_employees,
        crate::api::lookups::list_month_years
    ),
    components(
        schemas(
            UploadForm,
            UploadResponse,
            SalaryDataQuery,
            SalaryDataPayload,
            SalaryDataResponse,
            SalaryItemMetaResponse,
            UpsertItemMeta,
            DeleteItemMeta,
            ApiWindowPatch,
            PeriodWindowResponse,
            TaxCertificateResponse,
            UpsertTaxCertificate,
            Employee,
            EmployeeSummary,
            EmployeeListResponse,
            MonthYearListResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Upload", description = "Payroll workbook ingestion"),
        (name = "Salary", description = "Per-employee salary records and exports"),
        (name = "Salary item metadata", description = "Item name to group classification"),
        (name = "Publication window", description = "When employees may read a period"),
        (name = "50 ทวิ", description = "Withholding-tax certificate links"),
        (name = "Lookups", description = "Picker lists for front ends"),
    )
)]
pub struct ApiDoc;
