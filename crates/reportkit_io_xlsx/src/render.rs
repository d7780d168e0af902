//! One-shot entry points: parse descriptors, render a report file.

use std::io::Read;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::conf::derive_default_report_formats;
use crate::error::ReportError;
use crate::spec::{SpecReportOptions, SpecTableDescriptor};
use crate::util::derive_report_file_name;
use crate::writer::ReportWriter;

/// Read a JSON array of table descriptors from `reader`.
pub fn parse_table_descriptors<R: Read>(reader: R) -> Result<Vec<SpecTableDescriptor>, ReportError> {
    let l_tables: Vec<SpecTableDescriptor> = serde_json::from_reader(reader)?;
    log::debug!("Parsed {} table descriptors", l_tables.len());
    Ok(l_tables)
}

/// Output path for a report created at `timestamp`.
pub fn derive_report_path(options: &SpecReportOptions, timestamp: &DateTime<Local>) -> PathBuf {
    let dir_out = options.dir_out.clone().unwrap_or_else(std::env::temp_dir);
    let unique_token = options.if_unique_suffix.then(std::process::id);
    dir_out.join(derive_report_file_name(timestamp, unique_token))
}

/// Render all `tables` into one workbook and return its absolute path.
pub fn render_report(
    tables: &[SpecTableDescriptor],
    options: &SpecReportOptions,
) -> Result<PathBuf, ReportError> {
    let path_file_out = derive_report_path(options, &Local::now());
    let mut writer = ReportWriter::new(
        path_file_out,
        derive_default_report_formats(),
        options.clone(),
    )?;

    for table in tables {
        writer.write_table(table)?;
    }
    writer.close()
}
