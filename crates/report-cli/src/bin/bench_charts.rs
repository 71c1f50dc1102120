use std::path::PathBuf;

use benchmark_report::charts::{benchmark_specs, ChartGenerator, ChartProgress};
use benchmark_report::config::Config;
use benchmark_report::dataset::InstanceTable;
use benchmark_report::labels::add_label_column;
use clap::Parser;
use report_cli::{init_logging, print_outcomes, report_error};

/// Renders one bar chart PNG per selected benchmark metric.
///
/// Benchmarks are selected with `BENCHMARKS`; column names come from the `H_*`
/// variables. Charts that cannot be drawn are skipped.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// CSV file of benchmark results.
    csv: PathBuf,

    /// Directory the PNG files are written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let config = Config::from_env();

    let mut table = match InstanceTable::from_path(&cli.csv) {
        Ok(table) => table,
        Err(err) => {
            report_error(&err);
            return;
        }
    };
    let label_column = match add_label_column(&mut table, &config.columns) {
        Ok(name) => name,
        Err(err) => {
            report_error(&err);
            return;
        }
    };

    let (specs, mut outcomes) = benchmark_specs(&config);
    let generator =
        ChartGenerator::new(&cli.output_dir).with_fonts_dir(config.assets.fonts_dir.clone());
    outcomes.extend(
        generator.generate_all(&table, &label_column, &specs, |event| match event {
            ChartProgress::Generating(file) => println!("Generating '{}'", file),
            ChartProgress::Skipped { file, reason } => eprintln!("Error: '{}': {}", file, reason),
        }),
    );
    print_outcomes("Charts", &outcomes);
}
