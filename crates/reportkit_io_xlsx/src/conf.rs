//! Report constants and default preset factories.

use crate::spec::{SpecCellFormat, SpecReportFormats, SpecReportOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Excel column width maximum (character units).
pub const N_WIDTH_EXCEL_COLUMN_MAX: usize = 255;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Prefix of the per-table data sheet.
pub const PREFIX_SHEET_DATA: &str = "Data - ";
/// Prefix of the per-table chart sheet.
pub const PREFIX_SHEET_CHARTS: &str = "Charts - ";

/// Recognized table names.
pub const TABLE_NAME_LOGS: &str = "Logs";
pub const TABLE_NAME_RESOURCE_RECORDS: &str = "Resource records";
pub const TABLE_NAME_USERS: &str = "Users";

/// Header of the value column in every staging range.
pub const LABEL_STAGING_COUNT: &str = "Count";

/// Fixed level categories shown by the log-level pie.
pub const TUP_LOG_LEVELS: [&str; 3] = ["ERROR", "INFO", "WARN"];

/// Timestamp layout of the `Logs` time column.
pub const FMT_LOG_DATETIME: &str = "%Y-%m-%d %H:%M:%S";
/// Calendar-day key layout.
pub const FMT_DAY: &str = "%Y-%m-%d";

/// Output file stem prefix.
pub const PREFIX_FILE_REPORT: &str = "consolidated_report_";
/// Output file timestamp layout.
pub const FMT_FILE_TIMESTAMP: &str = "%Y%m%d%H%M%S";
/// Output file extension.
pub const EXT_FILE_REPORT: &str = "xlsx";

/// Zero-based `(row, col)` anchors for the first and second chart on a chart sheet.
pub const ANCHOR_CHART_PRIMARY: (u32, u16) = (4, 0);
pub const ANCHOR_CHART_SECONDARY: (u32, u16) = (4, 8);
/// Zero-based first column of the first and second staging range.
pub const COL_STAGING_PRIMARY: u16 = 0;
pub const COL_STAGING_SECONDARY: u16 = 3;

const COLOR_FILL_HEADER: &str = "#ADD8E6";
const COLOR_FILL_ROW_EVEN: &str = "#FFFFFF";
const COLOR_FILL_ROW_ODD: &str = "#F0F0F0";

/// Build default cell format presets used by [`crate::writer::ReportWriter`].
pub fn derive_default_report_formats() -> SpecReportFormats {
    let cfg_base_fmt_spec = SpecCellFormat {
        border: Some(1),
        ..Default::default()
    };

    SpecReportFormats {
        header: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            bg_color: Some(COLOR_FILL_HEADER.to_string()),
            ..Default::default()
        }),
        body_even: cfg_base_fmt_spec.with_(SpecCellFormat {
            bg_color: Some(COLOR_FILL_ROW_EVEN.to_string()),
            ..Default::default()
        }),
        body_odd: cfg_base_fmt_spec.with_(SpecCellFormat {
            bg_color: Some(COLOR_FILL_ROW_ODD.to_string()),
            ..Default::default()
        }),
    }
}

/// Build default report options.
pub fn derive_default_report_options() -> SpecReportOptions {
    SpecReportOptions::default()
}
