use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

use reportkit_io_xlsx::{
    EnumUsersRoleGuard, SpecReportOptions, derive_default_report_options, parse_table_descriptors,
    render_report,
};

/// Row guard for the "Users by Role" chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UsersRoleGuardArg {
    /// Count only rows with more than 8 columns.
    Legacy,
    /// Count every row that has the role column.
    RoleColumn,
}

impl From<UsersRoleGuardArg> for EnumUsersRoleGuard {
    fn from(value: UsersRoleGuardArg) -> Self {
        match value {
            UsersRoleGuardArg::Legacy => EnumUsersRoleGuard::Legacy,
            UsersRoleGuardArg::RoleColumn => EnumUsersRoleGuard::RoleColumn,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "reportkit",
    version,
    about = "Render JSON table descriptors into a consolidated XLSX report",
    long_about = "Reads a JSON array of {\"name\", \"rows\"} table descriptors and writes one \
                  data sheet and one chart sheet per table. Prints the absolute path of the \
                  generated workbook on stdout."
)]
struct Cli {
    /// Read table descriptors from this file instead of stdin.
    #[arg(short = 'i', long, value_hint = clap::ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Directory for the generated workbook (default: system temp dir).
    #[arg(short = 'o', long, value_hint = clap::ValueHint::DirPath)]
    output_dir: Option<PathBuf>,

    /// Append the process id to the file name.
    #[arg(long)]
    unique_suffix: bool,

    /// Which rows the "Users by Role" chart counts.
    #[arg(long, value_enum, default_value_t = UsersRoleGuardArg::Legacy)]
    users_role_guard: UsersRoleGuardArg,
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("REPORTKIT_LOG", "error,reportkit=info"))
        .init();

    // Usage errors exit 1 like every other failure; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(1);
        }
        Err(err) => err.exit(),
    };

    let l_tables = match &cli.input {
        Some(path) => {
            log::info!("Reading JSON input from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            parse_table_descriptors(BufReader::new(file))
        }
        None => {
            log::info!("Reading JSON input");
            parse_table_descriptors(io::stdin().lock())
        }
    }
    .context("Failed to read table descriptors")?;

    let options = SpecReportOptions {
        dir_out: cli.output_dir,
        if_unique_suffix: cli.unique_suffix,
        rule_users_role_guard: cli.users_role_guard.into(),
        ..derive_default_report_options()
    };

    let path_report = render_report(&l_tables, &options).context("Failed to create report")?;
    println!("{}", path_report.display());
    Ok(())
}
