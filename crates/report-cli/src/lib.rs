//! Shared plumbing for the benchmark command line tools.

use std::error::Error;

use benchmark_report::outcome::{ItemOutcome, OutcomeSummary};

/// Sends `log` output to stderr, at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Prints the `source()` chain of `error`, one cause per line.
pub fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

/// Prints `error` and its causes to stderr.
pub fn report_error(error: &(dyn Error + 'static)) {
    eprintln!("Error: {}", error);
    print_error_sources(error);
}

/// Prints a one-line tally followed by one line per skipped item.
pub fn print_outcomes(label: &str, outcomes: &[ItemOutcome]) {
    println!("{}: {}", label, OutcomeSummary::from_outcomes(outcomes));
    for outcome in outcomes {
        if let ItemOutcome::Skipped { item, reason } = outcome {
            println!("  skipped '{}': {}", item, reason);
        }
    }
}
