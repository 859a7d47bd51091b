//! Verify command

use anyhow::Result;
use camino::Utf8Path;
use vitrine_catalog::PostInstallStatus;

use super::{or_dash, print_json, AppContext};
use crate::cli::VerifyArgs;
use crate::output;

pub async fn run(args: VerifyArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let service = ctx.service()?;

    let report = service.checker().verify_post_install(&args.name).await;
    if args.json {
        return print_json(&report);
    }

    match &report.constraints {
        Some(declared) => {
            output::header(&format!("{} declares", args.name));
            output::kv("Plugin", or_dash(declared.name.as_deref().unwrap_or_default()));
            output::kv("Version", or_dash(declared.version.as_deref().unwrap_or_default()));
            output::kv("Min NetBox", or_dash(declared.min_version.as_deref().unwrap_or_default()));
            output::kv("Max NetBox", or_dash(declared.max_version.as_deref().unwrap_or_default()));
            println!();
        }
        None => output::info(&format!(
            "{} is not installed or declares no plugin config",
            args.name
        )),
    }

    match report.status {
        PostInstallStatus::Ok => output::success(&report.message),
        PostInstallStatus::Warning => output::warning(&report.message),
    }
    Ok(())
}
