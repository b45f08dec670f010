mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use javagate::build::BuildVerifier;
use javagate::config;
use javagate::error::{CheckError, EXIT_INFRASTRUCTURE};
use javagate::fetch::GitFetcher;
use javagate::pipeline::{self, Steps};
use javagate::process;
use javagate::report;
use javagate::style::StyleChecker;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("error: {e}");
            exit_code(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<i32, CheckError> {
    let cfg = config::resolve(cli.config.as_deref(), cli.settings())?;
    let steps = Steps::from_config(&cfg);

    if cli.check_tools {
        check_tools(&steps)?;
    }

    let (summary, artifacts) = pipeline::run_and_report(&cfg, &steps)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| CheckError::Report {
            path: artifacts.summary.clone(),
            source: e.into(),
        })?;
        println!("{json}");
    } else {
        println!("{}", report::render_text(&summary));
        println!("Report saved to: {}", artifacts.summary.display());
    }

    Ok(summary.exit_code())
}

/// Fail early with `ToolMissing` instead of halfway through a run.
fn check_tools(steps: &Steps<GitFetcher, BuildVerifier, StyleChecker>) -> Result<(), CheckError> {
    for (program, args) in [
        (steps.fetcher.git.as_str(), &["--version"][..]),
        (steps.builder.javac.as_str(), &["-version"][..]),
        (steps.style.java.as_str(), &["-version"][..]),
    ] {
        let version = process::ensure_available(program, args)?;
        tracing::info!("{program}: {version}");
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::from(EXIT_INFRASTRUCTURE as u8), ExitCode::from)
}
