//! Install and uninstall commands

use anyhow::{bail, Result};
use camino::Utf8Path;
use vitrine_catalog::installer::{config_snippet, post_install_commands};
use vitrine_catalog::{InstallEnvironment, InstallWorkflow, PostInstallStatus, WorkflowReport};

use super::{attempt_user, print_json, AppContext};
use crate::cli::{InstallArgs, UninstallArgs};
use crate::output;

pub async fn install(args: InstallArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let (name, version) = args.requested().map_err(anyhow::Error::msg)?;
    let ctx = AppContext::load(config_path)?;
    let service = ctx.service()?;
    let installer = ctx.installer();
    let log = ctx.attempt_log()?;
    let workflow = InstallWorkflow::new(&service, &installer, &log, ctx.config.allow_install);

    let spinner = (!args.json).then(|| {
        output::spinner(&format!(
            "Installing {} ({})...",
            name,
            installer.environment().as_str()
        ))
    });
    let report = workflow
        .install_plugin(name, version, attempt_user(args.user.clone()))
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = report?;

    if args.json {
        print_json(&report)?;
    } else {
        print_install_report(&report, installer.environment());
    }

    if !report.outcome.success {
        bail!("Failed to install {}", name);
    }
    Ok(())
}

fn print_install_report(report: &WorkflowReport, environment: &InstallEnvironment) {
    let outcome = &report.outcome;
    if !outcome.success {
        output::error(&outcome.error);
        if !outcome.output.is_empty() {
            output::block(&outcome.output);
        }
        return;
    }

    match environment {
        InstallEnvironment::WritableVenv => {
            let installed = format!("Installed {} {}", outcome.package, outcome.version);
            output::success(installed.trim_end());
        }
        InstallEnvironment::ImmutableImage { .. } => {
            output::success(&outcome.output);
            output::info("Rebuild the image to apply this change");
        }
    }

    if let Some(verification) = &report.verification {
        match verification.status {
            PostInstallStatus::Ok => output::info(&verification.message),
            PostInstallStatus::Warning => output::warning(&verification.message),
        }
    }

    output::header("Next steps");
    output::block(&config_snippet(&outcome.package));
    println!();
    for step in post_install_commands() {
        output::kv(step.label, step.command);
    }
}

pub async fn uninstall(args: UninstallArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let service = ctx.service()?;
    let installer = ctx.installer();
    let log = ctx.attempt_log()?;
    let workflow = InstallWorkflow::new(&service, &installer, &log, ctx.config.allow_install);

    let spinner = (!args.json).then(|| output::spinner(&format!("Uninstalling {}...", args.name)));
    let report = workflow
        .uninstall_plugin(&args.name, attempt_user(args.user))
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = report?;

    if args.json {
        print_json(&report)?;
    } else if report.outcome.success {
        match installer.environment() {
            InstallEnvironment::WritableVenv => {
                output::success(&format!("Uninstalled {}", args.name));
                output::info("Remove it from PLUGINS in configuration.py and restart NetBox");
            }
            InstallEnvironment::ImmutableImage { .. } => {
                output::success(&report.outcome.output);
                output::info("Rebuild the image to apply this change");
            }
        }
    } else {
        output::error(&report.outcome.error);
        if !report.outcome.output.is_empty() {
            output::block(&report.outcome.output);
        }
    }

    if !report.outcome.success {
        bail!("Failed to uninstall {}", args.name);
    }
    Ok(())
}
