use benchmark_report::config::Config;
use benchmark_report::pricing::{price_line, PriceQuery, NO_PRICE_FOUND};
use clap::error::ErrorKind;
use clap::Parser;
use report_cli::init_logging;

/// Prints the on-demand hourly price of one instance type as `<CURRENCY> <value>`.
///
/// Credentials are read from `KEY` and `SECRET`. Any failure prints `No price found`.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Cloud provider, e.g. `AWS`.
    provider: String,
    /// Provider region, e.g. `eu-west-2`.
    region: String,
    /// Instance type, e.g. `m5.large`.
    instance_type: String,
}

fn main() {
    init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            log::debug!("{}", err);
            println!("{}", NO_PRICE_FOUND);
            return;
        }
    };

    let config = Config::from_env();
    let query = PriceQuery {
        provider: cli.provider,
        region: cli.region,
        instance_type: cli.instance_type,
    };
    println!("{}", price_line(&config.pricing, &query));
}
