//! Stateless helper utilities used by the report writer.

use serde_json::Value;

use crate::conf::{
    EXT_FILE_REPORT, FMT_FILE_TIMESTAMP, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, PREFIX_FILE_REPORT, TUP_EXCEL_ILLEGAL,
};
use crate::error::ReportError;
use crate::spec::EnumCellValue;

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert one JSON value to a cell value; `None` for arrays/objects.
pub fn derive_cell_value_from_json(value: &Value) -> Option<EnumCellValue> {
    match value {
        Value::Null => Some(EnumCellValue::None),
        Value::String(val) => Some(EnumCellValue::String(val.clone())),
        Value::Bool(val) => Some(EnumCellValue::Boolean(*val)),
        Value::Number(val) => Some(match val.as_f64() {
            Some(n) => EnumCellValue::Number(n),
            None => EnumCellValue::String(val.to_string()),
        }),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Convert all rows of a table, failing on the first unsupported cell.
pub fn derive_cell_rows(
    table_name: &str,
    rows: &[Vec<Value>],
) -> Result<Vec<Vec<EnumCellValue>>, ReportError> {
    rows.iter()
        .enumerate()
        .map(|(n_idx_row, row)| {
            row.iter()
                .enumerate()
                .map(|(n_idx_col, value)| {
                    derive_cell_value_from_json(value).ok_or_else(|| {
                        ReportError::UnsupportedCell {
                            table: table_name.to_string(),
                            row: n_idx_row,
                            col: n_idx_col,
                            value: value.to_string(),
                        }
                    })
                })
                .collect()
        })
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthEstimation

/// Estimate displayed width units for one cell value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        _ => estimate_unicode_string_width(&value.to_display_text()),
    }
}

/// Character count with non-ASCII characters weighted 1.6.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name
        .chars()
        .take(N_LEN_EXCEL_SHEET_NAME_MAX)
        .collect::<String>()
        .trim_end_matches('\'')
        .to_string()
}

/// Create suffixed sheet name (`base__2`, `base__3`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, n_idx: usize) -> String {
    let c_sheet_name_suffix = format!("__{n_idx}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OutputNaming

/// Build `consolidated_report_<timestamp>[_<pid>].xlsx`.
pub fn derive_report_file_name<Tz>(
    timestamp: &chrono::DateTime<Tz>,
    unique_token: Option<u32>,
) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let c_stamp = timestamp.format(FMT_FILE_TIMESTAMP);
    match unique_token {
        Some(n_token) => format!("{PREFIX_FILE_REPORT}{c_stamp}_{n_token}.{EXT_FILE_REPORT}"),
        None => format!("{PREFIX_FILE_REPORT}{c_stamp}.{EXT_FILE_REPORT}"),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasts

pub fn cast_row_num(value: usize) -> Result<u32, ReportError> {
    let err = || ReportError::IndexOverflow(format!("row index overflow: {value}"));
    if value >= N_NROWS_EXCEL_MAX {
        return Err(err());
    }
    u32::try_from(value).map_err(|_| err())
}

pub fn cast_col_num(value: usize) -> Result<u16, ReportError> {
    let err = || ReportError::IndexOverflow(format!("column index overflow: {value}"));
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(err());
    }
    u16::try_from(value).map_err(|_| err())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_sanitize_sheet_name_replaces_and_truncates() {
        assert_eq!(sanitize_sheet_name("Data - a/b:c", "_"), "Data - a_b_c");
        assert_eq!(sanitize_sheet_name("  ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name("'quoted'", "_"), "quoted");

        let c_long = sanitize_sheet_name("Charts - an extremely long table name", "_");
        assert_eq!(c_long.chars().count(), N_LEN_EXCEL_SHEET_NAME_MAX);
        assert!(c_long.starts_with("Charts - an extremely"));
    }

    #[test]
    fn test_create_sheet_identifier_respects_length_cap() {
        assert_eq!(create_sheet_identifier("Data - Logs", 2), "Data - Logs__2");
        let c_name = create_sheet_identifier(&"x".repeat(40), 12);
        assert_eq!(c_name.chars().count(), N_LEN_EXCEL_SHEET_NAME_MAX);
        assert!(c_name.ends_with("__12"));
    }

    #[test]
    fn test_cell_rows_reject_nested_values() {
        let rows = vec![
            vec![json!("a"), json!(1), json!(null), json!(true)],
            vec![json!("b"), json!([1, 2])],
        ];
        let err = derive_cell_rows("Logs", &rows).expect_err("nested value must fail");
        match err {
            ReportError::UnsupportedCell { table, row, col, .. } => {
                assert_eq!(table, "Logs");
                assert_eq!((row, col), (1, 1));
            }
            other => panic!("unexpected error: {other}"),
        }

        let l_rows = derive_cell_rows("Logs", &rows[..1]).expect("flat row");
        assert_eq!(
            l_rows[0],
            vec![
                EnumCellValue::String("a".to_string()),
                EnumCellValue::Number(1.0),
                EnumCellValue::None,
                EnumCellValue::Boolean(true),
            ]
        );
    }

    #[test]
    fn test_width_covers_text_length() {
        assert_eq!(estimate_width_len(&EnumCellValue::None), 0);
        assert_eq!(
            estimate_width_len(&EnumCellValue::String("boom".to_string())),
            4
        );
        assert_eq!(estimate_width_len(&EnumCellValue::Number(3600.0)), 4);
        assert!(estimate_unicode_string_width("żółw") >= "żółw".chars().count());
    }

    #[test]
    fn test_report_file_name_layout() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(9, 8, 7))
            .expect("valid timestamp")
            .and_utc();
        assert_eq!(
            derive_report_file_name(&ts, None),
            "consolidated_report_20240501090807.xlsx"
        );
        assert_eq!(
            derive_report_file_name::<Utc>(&ts, Some(42)),
            "consolidated_report_20240501090807_42.xlsx"
        );
    }

    #[test]
    fn test_index_casts_enforce_excel_limits() {
        assert_eq!(cast_row_num(0).expect("row"), 0);
        assert!(cast_row_num(N_NROWS_EXCEL_MAX).is_err());
        assert_eq!(cast_col_num(5).expect("col"), 5);
        assert!(cast_col_num(N_NCOLS_EXCEL_MAX).is_err());
    }
}
