//! `reportkit_io_xlsx` v1:
//! Consolidated XLSX report renderer.
//!
//! Module layout:
//! - `conf`      : constants and default presets
//! - `spec`      : input models, options and per-table reports
//! - `error`     : top-level error type
//! - `schema`    : table-name registry (headers + chart specs)
//! - `aggregate` : category / calendar-day counting
//! - `util`      : pure helper functions
//! - `writer`    : stateful workbook writer
//! - `render`    : one-shot entry points
pub mod aggregate;
pub mod conf;
pub mod error;
pub mod render;
pub mod schema;
pub mod spec;
pub mod util;
pub mod writer;

pub use aggregate::{derive_aggregate, derive_category_counts, derive_day_counts};
pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, PREFIX_SHEET_CHARTS, PREFIX_SHEET_DATA, TUP_EXCEL_ILLEGAL,
    derive_default_report_formats, derive_default_report_options,
};
pub use error::ReportError;
pub use render::{derive_report_path, parse_table_descriptors, render_report};
pub use schema::{
    EnumAggregateRule, EnumChartKind, EnumDataLabel, SchemaRegistry, SpecChartSpec,
    SpecTableSchema,
};
pub use spec::{
    EnumAutofitColumnsRule, EnumCellValue, EnumUsersRoleGuard, SpecAggregateCount,
    SpecAutofitCellsPolicy, SpecCellFormat, SpecChartReport, SpecReportFormats,
    SpecReportOptions, SpecTableDescriptor, SpecTableReport,
};
pub use util::{derive_report_file_name, sanitize_sheet_name};
pub use writer::ReportWriter;
