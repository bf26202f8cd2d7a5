mod cli;

use clap::Parser;
use cli::Cli;
use newsyslog::config::{self, Config};
use newsyslog::observability;
use newsyslog::runner::{JobRunner, RunMode};
use std::process::ExitCode;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<ExitCode, AnyError> {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose, cli.log_json);

    let path = cli.config.unwrap_or_else(config::default_path);
    let config = match Config::load_with_includes(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "configuration error");
            return Ok(ExitCode::FAILURE);
        }
    };

    let runner = match JobRunner::from_config(&config) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration, no jobs run");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mode = if cli.test {
        RunMode::DryRun
    } else {
        RunMode::Execute
    };
    let report = runner.run(mode).await;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        for result in &report.results {
            println!("{result}");
        }
    }

    if report.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
