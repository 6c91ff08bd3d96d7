mod cli;
mod commands;
mod config;
mod progress;
mod ui;

use anyhow::{Context as AnyhowContext, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::Cli;
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            ui::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "tfstate-bootstrap", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let file = config::FileConfig::load(cli.config.as_deref())?;
    let settings = config::Settings::resolve(file, config::Overrides::from(cli))
        .context("Invalid configuration")?;
    log::debug!("Resolved settings: {settings:?} (verbosity {})", ctx.verbose);

    // clap guarantees a customer unless --completions was given
    let customer = cli.customer.clone().unwrap_or_default();

    let opts = commands::bootstrap::Options {
        customer,
        dry_run: cli.dry_run,
        json: cli.json,
        best_effort: cli.best_effort,
    };

    commands::bootstrap::run(&ctx, &opts, &settings)
}
