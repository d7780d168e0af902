//! Table schema registry: table name -> headers and chart specs.
//!
//! Everything the writer needs to know about a recognized table lives in one
//! [`SpecTableSchema`]; tables with no registered schema get an empty header
//! row and an empty chart sheet.

use std::collections::BTreeMap;

use crate::conf::{
    ANCHOR_CHART_PRIMARY, ANCHOR_CHART_SECONDARY, COL_STAGING_PRIMARY, COL_STAGING_SECONDARY,
    FMT_DAY, FMT_LOG_DATETIME, TABLE_NAME_LOGS, TABLE_NAME_RESOURCE_RECORDS, TABLE_NAME_USERS,
    TUP_LOG_LEVELS,
};
use crate::spec::{EnumUsersRoleGuard, SpecReportOptions};

////////////////////////////////////////////////////////////////////////////////
// #region ChartSpecification

/// Chart rendering kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumChartKind {
    /// Pie chart.
    Pie,
    /// Vertical bar chart.
    Column,
}

/// Data label display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumDataLabel {
    /// Show share of total per slice.
    Percentage,
    /// Show raw value.
    Value,
}

/// How one chart's `(category, count)` series is derived from table rows.
///
/// `n_cols_min` is the minimum row length for a row to be considered at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumAggregateRule {
    /// Count uppercased values of `col_idx`, but display only `categories`
    /// (in that order, missing ones as zero).
    CategoryFixed {
        col_idx: usize,
        n_cols_min: usize,
        categories: Vec<String>,
    },
    /// Count uppercased values of `col_idx`; every key becomes a category.
    CategoryOpen { col_idx: usize, n_cols_min: usize },
    /// Parse `col_idx` with `fmt_datetime` and count per `fmt_day` key.
    CalendarDay {
        col_idx: usize,
        n_cols_min: usize,
        fmt_datetime: String,
        fmt_day: String,
    },
}

impl EnumAggregateRule {
    /// Minimum row length considered by this rule.
    pub fn n_cols_min(&self) -> usize {
        match self {
            Self::CategoryFixed { n_cols_min, .. }
            | Self::CategoryOpen { n_cols_min, .. }
            | Self::CalendarDay { n_cols_min, .. } => *n_cols_min,
        }
    }
}

/// One chart on a chart sheet plus its staging range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChartSpec {
    /// Chart title.
    pub title: String,
    /// Header of the staging category column.
    pub label_category: String,
    /// Chart kind.
    pub kind: EnumChartKind,
    /// Data label display mode.
    pub data_label: EnumDataLabel,
    /// Series derivation rule.
    pub rule_aggregate: EnumAggregateRule,
    /// Zero-based first column of the two-column staging range.
    pub col_staging: u16,
    /// Zero-based `(row, col)` of the chart's top-left cell.
    pub anchor: (u32, u16),
}

/// Headers and charts of one recognized table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTableSchema {
    /// Exact table name.
    pub name: String,
    /// Header labels of the data sheet.
    pub headers: Vec<String>,
    /// Charts rendered on the chart sheet, in order.
    pub charts: Vec<SpecChartSpec>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Registry

/// Lookup of table schemas by exact name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    dict_schemas: BTreeMap<String, SpecTableSchema>,
}

impl SchemaRegistry {
    /// Empty registry; every table is unrecognized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `Logs`, `Resource records` and `Users` schemas.
    pub fn with_defaults(options: &SpecReportOptions) -> Self {
        let mut registry = Self::new();
        registry.register(derive_logs_schema());
        registry.register(derive_resource_records_schema());
        registry.register(derive_users_schema(options.rule_users_role_guard));
        registry
    }

    /// Add or replace a schema.
    pub fn register(&mut self, schema: SpecTableSchema) {
        self.dict_schemas.insert(schema.name.clone(), schema);
    }

    /// Schema registered under `name`, if any.
    pub fn resolve(&self, name: &str) -> Option<&SpecTableSchema> {
        self.dict_schemas.get(name)
    }

    /// Header labels for `name`; empty for unrecognized tables.
    pub fn headers_for(&self, name: &str) -> &[String] {
        self.resolve(name)
            .map(|schema| schema.headers.as_slice())
            .unwrap_or(&[])
    }
}

fn derive_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn derive_logs_schema() -> SpecTableSchema {
    SpecTableSchema {
        name: TABLE_NAME_LOGS.to_string(),
        headers: derive_strings(&["Time", "Level", "Message"]),
        charts: vec![
            SpecChartSpec {
                title: "Messages by Level".to_string(),
                label_category: "Level".to_string(),
                kind: EnumChartKind::Pie,
                data_label: EnumDataLabel::Percentage,
                rule_aggregate: EnumAggregateRule::CategoryFixed {
                    col_idx: 1,
                    n_cols_min: 2,
                    categories: derive_strings(&TUP_LOG_LEVELS),
                },
                col_staging: COL_STAGING_PRIMARY,
                anchor: ANCHOR_CHART_PRIMARY,
            },
            SpecChartSpec {
                title: "Messages by Day".to_string(),
                label_category: "Day".to_string(),
                kind: EnumChartKind::Column,
                data_label: EnumDataLabel::Value,
                rule_aggregate: EnumAggregateRule::CalendarDay {
                    col_idx: 0,
                    n_cols_min: 1,
                    fmt_datetime: FMT_LOG_DATETIME.to_string(),
                    fmt_day: FMT_DAY.to_string(),
                },
                col_staging: COL_STAGING_SECONDARY,
                anchor: ANCHOR_CHART_SECONDARY,
            },
        ],
    }
}

fn derive_resource_records_schema() -> SpecTableSchema {
    SpecTableSchema {
        name: TABLE_NAME_RESOURCE_RECORDS.to_string(),
        headers: derive_strings(&["ID", "Domain", "Data", "Type", "Class", "TTL"]),
        charts: vec![
            SpecChartSpec {
                title: "Records by Type".to_string(),
                label_category: "Type".to_string(),
                kind: EnumChartKind::Pie,
                data_label: EnumDataLabel::Percentage,
                rule_aggregate: EnumAggregateRule::CategoryOpen {
                    col_idx: 3,
                    n_cols_min: 4,
                },
                col_staging: COL_STAGING_PRIMARY,
                anchor: ANCHOR_CHART_PRIMARY,
            },
            SpecChartSpec {
                title: "Records by Class".to_string(),
                label_category: "Class".to_string(),
                kind: EnumChartKind::Pie,
                data_label: EnumDataLabel::Percentage,
                rule_aggregate: EnumAggregateRule::CategoryOpen {
                    col_idx: 4,
                    n_cols_min: 5,
                },
                col_staging: COL_STAGING_SECONDARY,
                anchor: ANCHOR_CHART_SECONDARY,
            },
        ],
    }
}

fn derive_users_schema(rule_guard: EnumUsersRoleGuard) -> SpecTableSchema {
    let n_cols_min = match rule_guard {
        EnumUsersRoleGuard::Legacy => 9,
        EnumUsersRoleGuard::RoleColumn => 5,
    };

    SpecTableSchema {
        name: TABLE_NAME_USERS.to_string(),
        headers: derive_strings(&["ID", "Login", "FirstName", "LastName", "Role"]),
        charts: vec![SpecChartSpec {
            title: "Users by Role".to_string(),
            label_category: "Role".to_string(),
            kind: EnumChartKind::Pie,
            data_label: EnumDataLabel::Percentage,
            rule_aggregate: EnumAggregateRule::CategoryOpen {
                col_idx: 4,
                n_cols_min,
            },
            col_staging: COL_STAGING_PRIMARY,
            anchor: ANCHOR_CHART_PRIMARY,
        }],
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
