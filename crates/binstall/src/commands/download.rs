//! Download command: check every spec in a directory and install updates

use crate::cli::DownloadArgs;
use crate::output;
use anyhow::{bail, Context, Result};
use binstall_core::{BinarySpec, RunConfig, SettingsLoader, SpecSet};
use binstall_update::{
    CheckOutcome, Orchestrator, Outcome, OutcomeObserver, UpdatePipeline, UpdatePlan,
};
use dialoguer::Confirm;
use indicatif::ProgressBar;
use std::sync::Arc;
use tabled::{settings::Style as TableStyle, Table, Tabled};
use tracing::debug;

/// Row of the pending-updates table
#[derive(Tabled, Debug, PartialEq, Eq)]
struct UpdateRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Current Version")]
    current_version: String,
    #[tabled(rename = "New Version")]
    new_version: String,
}

impl From<&UpdatePlan> for UpdateRow {
    fn from(plan: &UpdatePlan) -> Self {
        Self {
            name: plan.spec.name.clone(),
            current_version: plan.current_version.clone(),
            new_version: plan.new_version.clone(),
        }
    }
}

/// Specs selected for this run, plus per-file load errors
#[derive(Debug, Default)]
struct Selection {
    specs: Vec<BinarySpec>,
    errors: Vec<String>,
}

fn select_specs(set: &SpecSet, config: &RunConfig) -> Selection {
    let mut selection = Selection::default();

    for result in set {
        match result {
            Ok(spec) if spec.ignore => debug!("{}: ignored", spec.name),
            Ok(spec) if !config.selects(&spec.name) => debug!("{}: filtered out", spec.name),
            Ok(spec) => selection.specs.push(spec),
            Err(e) => selection.errors.push(e.to_string()),
        }
    }

    selection
}

fn build_config(args: &DownloadArgs) -> Result<RunConfig> {
    let settings = SettingsLoader::new()
        .and_then(|loader| loader.load())
        .context("Failed to load settings")?;

    Ok(RunConfig::from_settings(&settings)
        .with_parallel(args.parallel.unwrap_or(settings.parallel))
        .with_token(args.token.clone())
        .with_include(args.include.clone())
        .with_exclude(args.exclude.clone())
        .with_dry_run(args.dry_run)
        .with_check_only(args.check)
        .with_assume_yes(args.nqa))
}

/// Lines describing what installing `plan` would do
fn dry_run_summary(plan: &UpdatePlan) -> Vec<(&'static str, String)> {
    let mut lines = vec![
        ("Download", plan.download_url.clone()),
        ("Install location", plan.spec.install_location.clone()),
    ];
    for file in plan.spec.copied_files() {
        lines.push((
            "File",
            format!("{} -> {}", file.source_name(), file.destination_name()),
        ));
    }
    lines
}

/// Advances the install progress bar as outcomes arrive
struct ProgressObserver {
    progress: ProgressBar,
}

impl OutcomeObserver for ProgressObserver {
    fn on_outcome(&self, completed: usize, _total: usize, outcome: &Outcome) {
        self.progress.set_position(completed as u64);
        self.progress.set_message(outcome.name.clone());
    }
}

pub async fn run(args: DownloadArgs) -> Result<()> {
    let config = build_config(&args)?;

    let set = SpecSet::from_dir(&args.dir)
        .with_context(|| format!("Failed to read spec directory {}", args.dir.display()))?;
    let selection = select_specs(&set, &config);
    let mut failed = selection.errors.len();
    for e in &selection.errors {
        output::error(e);
    }

    if selection.specs.is_empty() {
        output::info("No binaries to check");
        return finish(failed);
    }

    let pipeline = UpdatePipeline::new(&config).context("Failed to initialize update pipeline")?;
    let orchestrator = Orchestrator::new(Arc::new(pipeline), config.parallel());

    let spinner = output::spinner(&format!(
        "Checking {} binaries for updates",
        selection.specs.len()
    ));
    let checks = orchestrator.check_all(selection.specs).await;
    spinner.finish_and_clear();

    let mut plans = Vec::new();
    for check in checks {
        match check {
            Ok(CheckOutcome::Update(plan)) => plans.push(*plan),
            Ok(CheckOutcome::UpToDate { name, current, latest }) => {
                debug!("{}: {} is the latest ({})", name, current, latest)
            }
            Ok(CheckOutcome::NoAsset { name }) => output::warning(&format!(
                "{}: no release asset for {}",
                name,
                binstall_update::OsArch::current()
            )),
            Err(failure) => {
                failed += 1;
                output::error(&failure.to_string());
            }
        }
    }

    if plans.is_empty() {
        output::success("No updates available");
        return finish(failed);
    }

    let rows: Vec<UpdateRow> = plans.iter().map(UpdateRow::from).collect();
    println!("{}", Table::new(&rows).with(TableStyle::rounded()));

    if config.check_only() {
        return finish(failed);
    }

    if config.dry_run() {
        for plan in &plans {
            output::header(plan.name());
            for (key, value) in dry_run_summary(plan) {
                output::kv(key, &value);
            }
        }
        return finish(failed);
    }

    if !config.assume_yes()
        && !Confirm::new()
            .with_prompt("Do you want to update?")
            .default(true)
            .interact()?
    {
        output::info("Update cancelled");
        return finish(failed);
    }

    let observer = ProgressObserver {
        progress: output::install_progress(plans.len()),
    };
    let report = orchestrator.run(plans, &observer).await;
    observer.progress.finish_and_clear();

    for outcome in &report.outcomes {
        match &outcome.error {
            None => output::success(&format!(
                "{} updated {} -> {}",
                outcome.name, outcome.current_version, outcome.new_version
            )),
            Some(e) => output::error(&format!(
                "{} failed while {}: {}",
                outcome.name, outcome.stage, e
            )),
        }
    }
    failed += report.failures().count();

    finish(failed)
}

fn finish(failed: usize) -> Result<()> {
    if failed > 0 {
        bail!("{} binaries failed", failed);
    }
    Ok(())
}
