//! Row counting used as chart series data.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::schema::EnumAggregateRule;
use crate::spec::{EnumCellValue, SpecAggregateCount};

/// Count rows by uppercased value of `col_idx`.
///
/// Rows shorter than `n_cols_min` are excluded; blank cells are skipped.
pub fn derive_category_counts(
    rows: &[Vec<EnumCellValue>],
    col_idx: usize,
    n_cols_min: usize,
) -> SpecAggregateCount {
    let mut agg = SpecAggregateCount::default();

    for row in rows {
        if row.len() < n_cols_min || row.len() <= col_idx {
            agg.n_rows_short += 1;
            continue;
        }
        let Some(c_key) = row[col_idx].to_category_key() else {
            agg.n_rows_skipped += 1;
            continue;
        };
        *agg.counts.entry(c_key).or_insert(0) += 1;
        agg.n_rows_counted += 1;
    }

    agg
}

/// Count rows per calendar day of the timestamp in `col_idx`.
///
/// Values that are not text or do not match `fmt_datetime` are skipped and
/// logged; they never fail the aggregate.
pub fn derive_day_counts(
    rows: &[Vec<EnumCellValue>],
    col_idx: usize,
    n_cols_min: usize,
    fmt_datetime: &str,
    fmt_day: &str,
) -> SpecAggregateCount {
    let mut agg = SpecAggregateCount::default();

    for (n_idx_row, row) in rows.iter().enumerate() {
        if row.len() < n_cols_min || row.len() <= col_idx {
            agg.n_rows_short += 1;
            continue;
        }

        let EnumCellValue::String(c_value) = &row[col_idx] else {
            log::warn!(
                "Skipping non-text timestamp in row {n_idx_row}: {:?}",
                row[col_idx]
            );
            agg.n_rows_skipped += 1;
            continue;
        };

        match parse_timestamp_strict(c_value, fmt_datetime) {
            Ok(dt) => {
                let c_day = dt.format(fmt_day).to_string();
                *agg.counts.entry(c_day).or_insert(0) += 1;
                agg.n_rows_counted += 1;
            }
            Err(err) => {
                log::warn!("Skipping invalid date format in row {n_idx_row} ({c_value:?}): {err}");
                agg.n_rows_skipped += 1;
            }
        }
    }

    agg
}

/// Parse `value` with `fmt_datetime`, stricter than chrono on whitespace.
///
/// Leading whitespace is rejected. When the format has a space between its
/// date and time parts, the value must have one too. Leap seconds (`:60`)
/// are rejected.
fn parse_timestamp_strict(value: &str, fmt_datetime: &str) -> Result<NaiveDateTime, String> {
    if value.starts_with(char::is_whitespace) {
        return Err("leading whitespace".to_string());
    }

    let dt = match fmt_datetime.split_once(' ') {
        Some((fmt_date, fmt_time)) => {
            let Some((c_date, c_time)) = value.split_once(' ') else {
                return Err("missing separator between date and time".to_string());
            };
            let date = NaiveDate::parse_from_str(c_date, fmt_date).map_err(|e| e.to_string())?;
            let time = NaiveTime::parse_from_str(c_time, fmt_time).map_err(|e| e.to_string())?;
            date.and_time(time)
        }
        None => NaiveDateTime::parse_from_str(value, fmt_datetime).map_err(|e| e.to_string())?,
    };

    if dt.nanosecond() >= 1_000_000_000 {
        return Err("leap second".to_string());
    }
    Ok(dt)
}

/// Dispatch on `rule`.
pub fn derive_aggregate(rows: &[Vec<EnumCellValue>], rule: &EnumAggregateRule) -> SpecAggregateCount {
    match rule {
        EnumAggregateRule::CategoryFixed {
            col_idx, n_cols_min, ..
        }
        | EnumAggregateRule::CategoryOpen {
            col_idx, n_cols_min,
        } => derive_category_counts(rows, *col_idx, *n_cols_min),
        EnumAggregateRule::CalendarDay {
            col_idx,
            n_cols_min,
            fmt_datetime,
            fmt_day,
        } => derive_day_counts(rows, *col_idx, *n_cols_min, fmt_datetime, fmt_day),
    }
}

/// Ordered `(category, count)` series to stage for a chart.
///
/// Fixed-category rules yield exactly their categories (zero when absent);
/// open rules yield every counted key in ascending order.
pub fn derive_chart_series(
    agg: &SpecAggregateCount,
    rule: &EnumAggregateRule,
) -> Vec<(String, usize)> {
    match rule {
        EnumAggregateRule::CategoryFixed { categories, .. } => categories
            .iter()
            .map(|c_cat| (c_cat.clone(), agg.counts.get(c_cat).copied().unwrap_or(0)))
            .collect(),
        EnumAggregateRule::CategoryOpen { .. } | EnumAggregateRule::CalendarDay { .. } => agg
            .counts
            .iter()
            .map(|(c_key, n_count)| (c_key.clone(), *n_count))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{FMT_DAY, FMT_LOG_DATETIME, TUP_LOG_LEVELS};

    fn s(value: &str) -> EnumCellValue {
        EnumCellValue::String(value.to_string())
    }

    fn log_rows() -> Vec<Vec<EnumCellValue>> {
        vec![
            vec![s("2024-05-01 09:00:00"), s("error"), s("x")],
            vec![s("2024-05-01 10:15:00"), s("info"), s("y")],
            vec![s("bad-date"), s("warn"), s("z")],
        ]
    }

    fn level_rule() -> EnumAggregateRule {
        EnumAggregateRule::CategoryFixed {
            col_idx: 1,
            n_cols_min: 2,
            categories: TUP_LOG_LEVELS.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_log_levels_and_days_from_mixed_rows() {
        let rows = log_rows();

        let agg_level = derive_aggregate(&rows, &level_rule());
        assert_eq!(
            derive_chart_series(&agg_level, &level_rule()),
            vec![
                ("ERROR".to_string(), 1),
                ("INFO".to_string(), 1),
                ("WARN".to_string(), 1)
            ]
        );

        let agg_day = derive_day_counts(&rows, 0, 1, FMT_LOG_DATETIME, FMT_DAY);
        assert_eq!(agg_day.counts.len(), 1);
        assert_eq!(agg_day.counts["2024-05-01"], 2);
        assert_eq!(agg_day.n_rows_skipped, 1);
    }

    #[test]
    fn test_fixed_levels_drop_unknown_and_fill_zero() {
        let rows = vec![
            vec![s("2024-05-01 09:00:00"), s("Error")],
            vec![s("2024-05-01 09:00:00"), s("ERROR")],
            vec![s("2024-05-01 09:00:00"), s("debug")],
            vec![s("2024-05-01 09:00:00")],
        ];
        let agg = derive_aggregate(&rows, &level_rule());
        let series = derive_chart_series(&agg, &level_rule());

        assert_eq!(agg.counts["DEBUG"], 1);
        assert_eq!(agg.n_rows_short, 1);
        assert_eq!(
            series,
            vec![
                ("ERROR".to_string(), 2),
                ("INFO".to_string(), 0),
                ("WARN".to_string(), 0)
            ]
        );
        let n_known: usize = series.iter().map(|(_, n)| n).sum();
        assert_eq!(n_known, 2);
    }

    #[test]
    fn test_open_categories_sorted_and_case_collapsed() {
        let rows = vec![
            vec![s("1"), s("a.example"), s("1.2.3.4"), s("a"), s("in"), s("3600")],
            vec![s("2"), s("b.example"), s("::1"), s("AAAA"), s("IN"), s("3600")],
            vec![s("3"), s("c.example"), s("a.example"), s("cname"), s("CH"), s("60")],
            vec![s("4"), s("d.example"), s("1.2.3.5"), s("A"), s("in"), s("60")],
        ];
        let rule = EnumAggregateRule::CategoryOpen {
            col_idx: 3,
            n_cols_min: 4,
        };
        let agg = derive_aggregate(&rows, &rule);
        assert_eq!(
            derive_chart_series(&agg, &rule),
            vec![
                ("A".to_string(), 2),
                ("AAAA".to_string(), 1),
                ("CNAME".to_string(), 1)
            ]
        );

        let agg_class = derive_category_counts(&rows, 4, 5);
        assert_eq!(
            agg_class.counts.keys().cloned().collect::<Vec<_>>(),
            vec!["CH".to_string(), "IN".to_string()]
        );
        assert_eq!(agg_class.total(), rows.len());
    }

    #[test]
    fn test_legacy_users_guard_excludes_five_column_rows() {
        let rows = vec![
            vec![
                EnumCellValue::Number(1.0),
                s("root"),
                s("R"),
                s("Oot"),
                s("admin"),
            ],
            vec![
                EnumCellValue::Number(2.0),
                s("bob"),
                s("B"),
                s("Ob"),
                s("user"),
            ],
        ];

        let agg_legacy = derive_category_counts(&rows, 4, 9);
        assert!(agg_legacy.is_empty());
        assert_eq!(agg_legacy.n_rows_short, 2);

        let agg_fixed = derive_category_counts(&rows, 4, 5);
        assert_eq!(agg_fixed.counts["ADMIN"], 1);
        assert_eq!(agg_fixed.counts["USER"], 1);
    }

    #[test]
    fn test_day_counts_reject_loose_timestamps() {
        for c_value in [
            "2024-05-0110:00:00",
            " 2024-05-01 10:00:00",
            "2024-05-01 23:59:60",
            "2024-05-01T10:00:00",
            "2024-05-01 10:00:00 ",
        ] {
            let agg = derive_day_counts(&[vec![s(c_value)]], 0, 1, FMT_LOG_DATETIME, FMT_DAY);
            assert_eq!(agg.n_rows_counted, 0, "{c_value:?} must be skipped");
            assert_eq!(agg.n_rows_skipped, 1);
        }

        let agg = derive_day_counts(
            &[vec![s("2024-5-1 9:0:0")], vec![s("2024-05-01 23:59:59")]],
            0,
            1,
            FMT_LOG_DATETIME,
            FMT_DAY,
        );
        assert_eq!(agg.counts["2024-05-01"], 2);
    }

    #[test]
    fn test_day_counts_skip_non_text_and_sort_days() {
        let rows = vec![
            vec![s("2024-05-02 00:00:01")],
            vec![EnumCellValue::Number(1.0)],
            vec![s("2024-04-30 23:59:59")],
            vec![s("2024-05-02 12:00:00")],
            vec![s("2024-05-02")],
        ];
        let agg = derive_day_counts(&rows, 0, 1, FMT_LOG_DATETIME, FMT_DAY);
        assert_eq!(
            agg.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect::<Vec<_>>(),
            vec![("2024-04-30", 1), ("2024-05-02", 2)]
        );
        assert_eq!(agg.n_rows_skipped, 2);
        assert_eq!(agg.total(), agg.n_rows_counted);
    }
}
