//! Report writer that renders table descriptors into data and chart sheets.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartType, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
};

use crate::aggregate::{derive_aggregate, derive_chart_series};
use crate::conf::{
    LABEL_STAGING_COUNT, N_LEN_EXCEL_SHEET_NAME_MAX, N_WIDTH_EXCEL_COLUMN_MAX,
    PREFIX_SHEET_CHARTS, PREFIX_SHEET_DATA,
};
use crate::error::ReportError;
use crate::schema::{EnumChartKind, EnumDataLabel, SchemaRegistry, SpecChartSpec, SpecTableSchema};
use crate::spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat,
    SpecChartReport, SpecReportFormats, SpecReportOptions, SpecTableDescriptor, SpecTableReport,
};
use crate::util::{
    cast_col_num, cast_row_num, create_sheet_identifier, derive_cell_rows, estimate_width_len,
    estimate_unicode_string_width, sanitize_sheet_name,
};

/// Stateful workbook writer.
pub struct ReportWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    formats: SpecReportFormats,
    options: SpecReportOptions,
    registry: SchemaRegistry,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecTableReport>,
    path_file_saved: Option<PathBuf>,
}

impl ReportWriter {
    /// Create writer bound to output path and format/options presets.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(
        path_file_out: PathBuf,
        formats: SpecReportFormats,
        options: SpecReportOptions,
    ) -> Result<Self, ReportError> {
        validate_policy_autofit(&options.policy_autofit)?;
        let registry = SchemaRegistry::with_defaults(&options);

        Ok(Self {
            path_file_out,
            workbook: Workbook::new(),
            formats,
            options,
            registry,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            path_file_saved: None,
        })
    }

    /// Replace the schema registry used to resolve table names.
    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return immutable snapshot of per-table write reports.
    pub fn report(&self) -> Vec<SpecTableReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk and return the absolute path. Idempotent.
    ///
    /// Fails with [`ReportError::OutputMissing`] when no non-empty file is
    /// found at the output path after saving.
    pub fn close(&mut self) -> Result<PathBuf, ReportError> {
        if let Some(path_saved) = &self.path_file_saved {
            return Ok(path_saved.clone());
        }

        log::info!("Saving file to: {}", self.path_file_out.display());
        self.workbook.save(&self.path_file_out)?;
        let path_saved = verify_output_file(&self.path_file_out)?;
        log::info!("File saved successfully: {}", path_saved.display());

        self.path_file_saved = Some(path_saved.clone());
        Ok(path_saved)
    }

    /// Write the data sheet and chart sheet of one table.
    pub fn write_table(&mut self, table: &SpecTableDescriptor) -> Result<(), ReportError> {
        if self.path_file_saved.is_some() {
            return Err(ReportError::Closed);
        }
        log::info!(
            "Processing table: {}, rows: {}",
            table.name,
            table.rows.len()
        );

        let l_rows = derive_cell_rows(&table.name, &table.rows)?;
        let schema = self.registry.resolve(&table.name).cloned();
        let l_headers = schema
            .as_ref()
            .map(|val| val.headers.clone())
            .unwrap_or_default();
        log::debug!("Headers: {l_headers:?}");

        let mut report = SpecTableReport {
            table_name: table.name.clone(),
            n_rows: l_rows.len(),
            ..Default::default()
        };

        report.sheet_data =
            self.derive_unique_sheet_name(&format!("{PREFIX_SHEET_DATA}{}", table.name));
        self.write_data_sheet(&report.sheet_data, &l_headers, &l_rows)?;
        log::info!(
            "Wrote {} rows to data sheet: {}",
            l_rows.len(),
            report.sheet_data
        );

        report.sheet_charts =
            self.derive_unique_sheet_name(&format!("{PREFIX_SHEET_CHARTS}{}", table.name));
        let sheet_charts = report.sheet_charts.clone();
        self.write_chart_sheet(&sheet_charts, schema.as_ref(), &l_rows, &mut report)?;
        log::info!("Created chart sheet: {sheet_charts}");

        self.l_reports.push(report);
        Ok(())
    }

    fn write_data_sheet(
        &mut self,
        sheet_name: &str,
        headers: &[String],
        rows: &[Vec<EnumCellValue>],
    ) -> Result<(), ReportError> {
        let fmt_header = derive_rust_xlsx_format(&self.formats.header);
        let fmt_body_even = derive_rust_xlsx_format(&self.formats.body_even);
        let fmt_body_odd = derive_rust_xlsx_format(&self.formats.body_odd);
        let l_widths = plan_column_widths(headers, rows, &self.options.policy_autofit);

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        write_header(worksheet, headers, &fmt_header)?;

        for (n_idx_row, row) in rows.iter().enumerate() {
            // Body starts on the second sheet row (Excel row 2).
            let n_row_sheet = n_idx_row + 1;
            let fmt_body = if (n_row_sheet + 1) % 2 == 0 {
                &fmt_body_even
            } else {
                &fmt_body_odd
            };
            for (n_idx_col, value) in row.iter().enumerate() {
                write_cell_with_format(worksheet, n_row_sheet, n_idx_col, value, fmt_body)?;
            }
        }

        for (n_idx_col, n_width) in l_widths.into_iter().enumerate() {
            worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width as f64)?;
        }

        Ok(())
    }

    fn write_chart_sheet(
        &mut self,
        sheet_name: &str,
        schema: Option<&SpecTableSchema>,
        rows: &[Vec<EnumCellValue>],
        report: &mut SpecTableReport,
    ) -> Result<(), ReportError> {
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        let Some(schema) = schema else {
            return Ok(());
        };
        if rows.is_empty() {
            return Ok(());
        }

        for spec_chart in &schema.charts {
            let agg = derive_aggregate(rows, &spec_chart.rule_aggregate);
            log::info!("{} counts: {:?}", spec_chart.title, agg.counts);

            if agg.n_rows_short > 0 {
                let c_msg = format!(
                    "{}: {} of {} rows have fewer than {} columns and were excluded",
                    spec_chart.title,
                    agg.n_rows_short,
                    rows.len(),
                    spec_chart.rule_aggregate.n_cols_min()
                );
                log::warn!("{c_msg}");
                report.warn(c_msg);
            }
            if agg.n_rows_skipped > 0 {
                let c_msg = format!(
                    "{}: {} rows skipped (blank or unparseable value)",
                    spec_chart.title, agg.n_rows_skipped
                );
                log::warn!("{c_msg}");
                report.warn(c_msg);
            }
            if agg.is_empty() {
                continue;
            }

            let l_series = derive_chart_series(&agg, &spec_chart.rule_aggregate);
            write_chart_staging(worksheet, spec_chart, &l_series)?;

            let chart = derive_chart(sheet_name, spec_chart, l_series.len())?;
            worksheet.insert_chart(spec_chart.anchor.0, spec_chart.anchor.1, &chart)?;
            log::info!("Added chart: {}", spec_chart.title);

            report.charts.push(SpecChartReport {
                title: spec_chart.title.clone(),
                series: l_series,
            });
        }

        Ok(())
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        let c_name = sanitize_sheet_name(name, "_");
        // Excel compares sheet names case-insensitively.
        if self.set_sheet_names_existing.insert(c_name.to_lowercase()) {
            return c_name;
        }

        let base_name: String = c_name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate = create_sheet_identifier(&base_name, n_idx);
            if self.set_sheet_names_existing.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n_idx += 1;
        }
    }
}

/// Plan final data-sheet widths for the header columns.
///
/// Each width is `max(header, longest body cell) + padding`, clamped by the
/// policy. Columns beyond the header row get no explicit width.
pub fn plan_column_widths(
    headers: &[String],
    rows: &[Vec<EnumCellValue>],
    policy_autofit: &SpecAutofitCellsPolicy,
) -> Vec<usize> {
    if matches!(policy_autofit.rule_columns, EnumAutofitColumnsRule::None) || headers.is_empty()
    {
        return vec![];
    }

    let l_width_by_col_header: Vec<usize> = headers
        .iter()
        .map(|c_header| estimate_unicode_string_width(c_header))
        .collect();
    let mut l_width_by_col_body = vec![0usize; headers.len()];
    for row in rows {
        for (n_idx_col, value) in row.iter().take(headers.len()).enumerate() {
            l_width_by_col_body[n_idx_col] =
                usize::max(l_width_by_col_body[n_idx_col], estimate_width_len(value));
        }
    }

    let n_min = usize::max(1, policy_autofit.width_cell_min);
    let n_max = usize::min(
        N_WIDTH_EXCEL_COLUMN_MAX,
        usize::max(n_min, policy_autofit.width_cell_max),
    );
    let n_pad = policy_autofit.width_cell_padding;

    (0..headers.len())
        .map(|n_idx_col| {
            let n_width_recorded = match policy_autofit.rule_columns {
                EnumAutofitColumnsRule::Header | EnumAutofitColumnsRule::None => {
                    l_width_by_col_header[n_idx_col]
                }
                EnumAutofitColumnsRule::Body => l_width_by_col_body[n_idx_col],
                EnumAutofitColumnsRule::All => usize::max(
                    l_width_by_col_header[n_idx_col],
                    l_width_by_col_body[n_idx_col],
                ),
            };
            usize::min(n_max, usize::max(n_min, n_width_recorded + n_pad))
        })
        .collect()
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), ReportError> {
    if policy_autofit.width_cell_min == 0 {
        return Err(ReportError::InvalidOption(
            "policy_autofit.width_cell_min must be >= 1.".to_string(),
        ));
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(ReportError::InvalidOption(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        ));
    }
    Ok(())
}

fn verify_output_file(path: &Path) -> Result<PathBuf, ReportError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(std::fs::canonicalize(path)?),
        _ => {
            log::error!("File {} was not created", path.display());
            Err(ReportError::OutputMissing(path.to_path_buf()))
        }
    }
}

fn write_header(
    worksheet: &mut Worksheet,
    headers: &[String],
    fmt_header: &Format,
) -> Result<(), ReportError> {
    for (col_idx, cell_value) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, cast_col_num(col_idx)?, cell_value, fmt_header)?;
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), ReportError> {
    let row_num = cast_row_num(row_idx)?;
    let col_num = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(row_num, col_num, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(row_num, col_num, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(row_num, col_num, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(row_num, col_num, *val, format)?;
        }
    }
    Ok(())
}

/// Write `(label, "Count")` then one `(category, count)` row per entry.
fn write_chart_staging(
    worksheet: &mut Worksheet,
    spec_chart: &SpecChartSpec,
    series: &[(String, usize)],
) -> Result<(), ReportError> {
    let n_col_category = spec_chart.col_staging;
    let n_col_value = n_col_category + 1;

    worksheet.write_string(0, n_col_category, spec_chart.label_category.as_str())?;
    worksheet.write_string(0, n_col_value, LABEL_STAGING_COUNT)?;
    for (n_idx, (c_category, n_count)) in series.iter().enumerate() {
        let n_row = cast_row_num(n_idx + 1)?;
        worksheet.write_string(n_row, n_col_category, c_category.as_str())?;
        worksheet.write_number(n_row, n_col_value, *n_count as f64)?;
    }
    Ok(())
}

/// Build a chart whose series points at the staging range on `sheet_name`.
fn derive_chart(
    sheet_name: &str,
    spec_chart: &SpecChartSpec,
    n_categories: usize,
) -> Result<Chart, ReportError> {
    let mut chart = Chart::new(match spec_chart.kind {
        EnumChartKind::Pie => ChartType::Pie,
        EnumChartKind::Column => ChartType::Column,
    });
    chart.title().set_name(spec_chart.title.as_str());

    let mut data_label = ChartDataLabel::new();
    match spec_chart.data_label {
        EnumDataLabel::Percentage => {
            data_label.show_percentage();
        }
        EnumDataLabel::Value => {
            data_label.show_value();
        }
    }

    let n_row_first = 1u32;
    let n_row_last = cast_row_num(n_categories)?;
    let n_col_category = spec_chart.col_staging;
    let n_col_value = n_col_category + 1;

    chart
        .add_series()
        .set_name((sheet_name, 0u32, n_col_value))
        .set_categories((sheet_name, n_row_first, n_col_category, n_row_last, n_col_category))
        .set_values((sheet_name, n_row_first, n_col_value, n_row_last, n_col_value))
        .set_data_label(&data_label);

    Ok(chart)
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}
