use std::path::PathBuf;

use benchmark_report::config::Config;
use benchmark_report::report::ReportBuilder;
use clap::error::ErrorKind;
use clap::Parser;
use report_cli::{init_logging, print_outcomes, report_error};

/// Generates the PDF benchmark report from the charts and the results CSV.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Directory containing the chart images.
    chart_directory: PathBuf,
    /// CSV file of benchmark results.
    csv: PathBuf,
    /// Path of the PDF report to generate.
    pdf_report: PathBuf,
}

fn main() {
    init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let _ = err.print();
            eprintln!("Missing command line argument. Aborting");
            std::process::exit(1);
        }
    };

    let config = Config::from_env();
    let builder = ReportBuilder::new(&config, &cli.chart_directory);
    let outcome = builder.generate_with(&cli.csv, &cli.pdf_report, |path| {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        println!("Generating '{}'", file_name);
    });

    match outcome {
        Ok(skipped) => {
            if !skipped.is_empty() {
                print_outcomes("Left out of the report", &skipped);
            }
        }
        Err(err) => {
            report_error(&err);
            std::process::exit(1);
        }
    }
}
