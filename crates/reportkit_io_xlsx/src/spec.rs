//! Shared report specification models.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

////////////////////////////////////////////////////////////////////////////////
// #region InputSpecification

/// One named dataset as supplied on the input stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpecTableDescriptor {
    /// Table name; selects headers and charts through the schema registry.
    pub name: String,
    /// Raw rows, column meaning is positional.
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Normalized cell value during the write pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    /// Text shown for this value, as used for width estimation.
    pub fn to_display_text(&self) -> String {
        match self {
            EnumCellValue::None => String::new(),
            EnumCellValue::String(s) => s.clone(),
            EnumCellValue::Number(n) => n.to_string(),
            EnumCellValue::Boolean(b) => if *b { "True" } else { "False" }.to_string(),
        }
    }

    /// Uppercased aggregate key; `None` for blank cells.
    pub fn to_category_key(&self) -> Option<String> {
        match self {
            EnumCellValue::None => None,
            EnumCellValue::String(s) => Some(s.to_uppercase()),
            EnumCellValue::Number(n) => Some(n.to_string()),
            EnumCellValue::Boolean(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,
    /// Horizontal alignment.
    pub align: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Background fill color.
    pub bg_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            border: other.border.or(self.border),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
        }
    }
}

/// Named format presets of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportFormats {
    /// Header row format.
    pub header: SpecCellFormat,
    /// Body format for even Excel rows (2, 4, ...).
    pub body_even: SpecCellFormat,
    /// Body format for odd Excel rows (3, 5, ...).
    pub body_odd: SpecCellFormat,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from header cells only.
    Header,
    /// Infer width from body cells only.
    Body,
    /// Infer width from both header and body cells (default).
    #[default]
    All,
}

/// Autofit policy for data sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::All,
            width_cell_min: 1,
            width_cell_max: 255,
            width_cell_padding: 2,
        }
    }
}

/// Row guard used by the `Users` role aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumUsersRoleGuard {
    /// Only rows with more than 8 columns are counted.
    #[default]
    Legacy,
    /// Rows that have the role column (index 4) are counted.
    RoleColumn,
}

/// Report-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecReportOptions {
    /// Output directory; platform temp dir when `None`.
    pub dir_out: Option<PathBuf>,
    /// Append the process id to the output file stem.
    pub if_unique_suffix: bool,
    /// Row guard of the `Users` role aggregate.
    pub rule_users_role_guard: EnumUsersRoleGuard,
    /// Data-sheet column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region AggregateSpecification

/// Per-category row counts of one table column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecAggregateCount {
    /// Count by uppercased key, ascending key order.
    pub counts: BTreeMap<String, usize>,
    /// Rows that contributed to `counts`.
    pub n_rows_counted: usize,
    /// Rows excluded by the column-count guard.
    pub n_rows_short: usize,
    /// Rows whose value was blank or could not be parsed.
    pub n_rows_skipped: usize,
}

impl SpecAggregateCount {
    /// Whether any key was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// One rendered chart and the series it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChartReport {
    /// Chart title.
    pub title: String,
    /// `(category, count)` pairs in staging order.
    pub series: Vec<(String, usize)>,
}

/// Per-table write report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecTableReport {
    /// Input table name.
    pub table_name: String,
    /// Actual data sheet name in workbook.
    pub sheet_data: String,
    /// Actual chart sheet name in workbook.
    pub sheet_charts: String,
    /// Body rows written to the data sheet.
    pub n_rows: usize,
    /// Charts attached to the chart sheet.
    pub charts: Vec<SpecChartReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecTableReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Look up a chart by title.
    pub fn chart(&self, title: &str) -> Option<&SpecChartReport> {
        self.charts.iter().find(|chart| chart.title == title)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
