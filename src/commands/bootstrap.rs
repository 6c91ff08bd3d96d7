//! Bootstrap command - create the state bucket and lock table for a customer

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::ProgressBar;
use serde::Serialize;
use std::cell::RefCell;
use std::process::ExitCode;

use statekit::{
    Bootstrapper, BootstrapReport, DEFAULT_CAPACITY, Layout, NoopObserver, Observer, Plan, Step,
    StepOutcome,
};

use crate::Context as AppContext;
use crate::config::Settings;
use crate::progress;
use crate::ui;

/// What to bootstrap and how to report it.
#[derive(Debug, Clone)]
pub struct Options {
    pub customer: String,
    pub dry_run: bool,
    pub json: bool,
    pub best_effort: bool,
}

/// `--dry-run --json` output.
#[derive(Debug, Serialize)]
struct DryRun<'a> {
    #[serde(flatten)]
    plan: &'a Plan,
    credentials: String,
}

pub fn run(ctx: &AppContext, opts: &Options, settings: &Settings) -> Result<ExitCode> {
    let layout = layout(settings);
    let plan = layout.plan(&opts.customer);

    if opts.dry_run {
        print_plan(ctx, opts, settings, &plan)?;
        return Ok(ExitCode::SUCCESS);
    }

    if !opts.json {
        if !ctx.quiet {
            ui::header(&format!("Bootstrapping Terraform state for {}", opts.customer));
            ui::kv("Region", plan.region.as_str());
            ui::kv("Credentials", &settings.aws.credential_source());
            println!();
        }
        print_warnings(&plan);
    }

    let bootstrapper = Bootstrapper::new(&settings.aws)
        .context("Failed to create AWS clients")?
        .with_layout(layout);

    let report = if opts.json {
        bootstrapper.bootstrap(&opts.customer, &NoopObserver)
    } else {
        bootstrapper.bootstrap(&opts.customer, &ConsoleObserver::new(ctx.quiet))
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !ctx.quiet {
        print_summary(&report);
    }

    if fails_run(&report, opts.best_effort) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Region, lock table and throughput from the resolved settings.
fn layout(settings: &Settings) -> Layout {
    let layout = Layout::new(settings.aws.region.clone()).with_capacity(
        settings.read_capacity.unwrap_or(DEFAULT_CAPACITY),
        settings.write_capacity.unwrap_or(DEFAULT_CAPACITY),
    );
    match &settings.table_name {
        Some(table) => layout.with_table_name(table.clone()),
        None => layout,
    }
}

fn warning_line(bucket: &str, warning: &str) -> String {
    format!("Bucket name {bucket}: {warning}")
}

fn print_warnings(plan: &Plan) {
    for warning in &plan.warnings {
        ui::warn(&warning_line(&plan.names.bucket, warning));
    }
}

/// Failed steps only change the exit status when the caller asks for it.
fn fails_run(report: &BootstrapReport, best_effort: bool) -> bool {
    !report.is_success() && !best_effort
}

fn print_plan(ctx: &AppContext, opts: &Options, settings: &Settings, plan: &Plan) -> Result<()> {
    if opts.json {
        let dry_run = DryRun {
            plan,
            credentials: settings.aws.credential_source(),
        };
        println!("{}", serde_json::to_string_pretty(&dry_run)?);
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!("Dry run for {}", plan.customer));
        ui::kv("Region", plan.region.as_str());
        ui::kv("Credentials", &settings.aws.credential_source());
        println!();
    }

    ui::step(1, 2, &format!("Would create bucket: {}", plan.names.bucket.bold()));
    ui::dim(&format!("LocationConstraint: {}", plan.region));
    ui::dim("Versioning: Enabled");
    print_warnings(plan);

    ui::step(
        2,
        2,
        &format!("Would create DynamoDB table: {}", plan.lock_table.name.bold()),
    );
    ui::dim(&format!(
        "Hash key: {} ({})",
        plan.lock_table.hash_key,
        plan.lock_table.key_type.as_str()
    ));
    ui::dim(&format!(
        "Throughput: {} read / {} write",
        plan.lock_table.read_capacity, plan.lock_table.write_capacity
    ));

    println!();
    ui::info("Dry run - no changes made");
    Ok(())
}

fn print_summary(report: &BootstrapReport) {
    println!();
    if report.is_success() {
        ui::success(&format!(
            "State storage ready: bucket {} in {}, lock table {}",
            report.names.bucket, report.region, report.names.table
        ));
        return;
    }

    let failed = report.failed();
    let label = if failed == 1 { "step" } else { "steps" };
    ui::failure(&format!("{failed} {label} failed for {}", report.customer));
    for (step, outcome) in report.steps() {
        if let StepOutcome::Failed { category, .. } = outcome {
            ui::dim(&format!("{step}: {} - {}", category.description(), category.advice()));
        }
    }
}

// ============================================================================
// Console Observer
// ============================================================================

/// Renders step progress as status lines.
struct ConsoleObserver {
    quiet: bool,
    spinner: RefCell<Option<ProgressBar>>,
}

impl ConsoleObserver {
    fn new(quiet: bool) -> Self {
        Self {
            quiet,
            spinner: RefCell::new(None),
        }
    }
}

impl Observer for ConsoleObserver {
    fn step_started(&self, step: Step, target: &str) {
        let (num, msg) = match step {
            Step::Storage => (1, format!("Creating bucket: {target}...")),
            Step::LockTable => (2, format!("Creating DynamoDB table: {target}...")),
        };
        if !self.quiet {
            ui::step(num, 2, &msg);
        }
        *self.spinner.borrow_mut() = Some(progress::spinner("waiting for AWS"));
    }

    fn step_finished(&self, step: Step, _target: &str, outcome: &StepOutcome) {
        if let Some(pb) = self.spinner.borrow_mut().take() {
            pb.finish_and_clear();
        }
        print_outcome(step, outcome);
    }
}

/// How a finished step is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Success,
    Info,
    Failure,
}

fn outcome_line(step: Step, outcome: &StepOutcome) -> (LineKind, String) {
    match (step, outcome) {
        (Step::Storage, StepOutcome::Created) => (
            LineKind::Success,
            "S3 bucket created with versioning".to_string(),
        ),
        (Step::LockTable, StepOutcome::Created) => {
            (LineKind::Success, "DynamoDB table created".to_string())
        }
        (Step::Storage, StepOutcome::Skipped { reason }) => {
            (LineKind::Info, format!("S3 bucket skipped: {reason}"))
        }
        (Step::LockTable, StepOutcome::Skipped { .. }) => (
            LineKind::Info,
            "DynamoDB table already exists, skipping".to_string(),
        ),
        (Step::Storage, StepOutcome::Failed { error, .. }) => {
            (LineKind::Failure, format!("S3 error: {error}"))
        }
        (Step::LockTable, StepOutcome::Failed { error, .. }) => {
            (LineKind::Failure, format!("DynamoDB error: {error}"))
        }
    }
}

fn print_outcome(step: Step, outcome: &StepOutcome) {
    match outcome_line(step, outcome) {
        (LineKind::Success, line) => ui::success(&line),
        (LineKind::Info, line) => ui::info(&line),
        (LineKind::Failure, line) => ui::failure(&line),
    }
}
