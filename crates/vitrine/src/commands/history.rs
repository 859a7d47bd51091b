//! History command

use anyhow::Result;
use camino::Utf8Path;
use tabled::{settings::Style, Table, Tabled};
use vitrine_catalog::AttemptQuery;
use vitrine_core::types::{AttemptStatus, InstallationAttempt};

use super::{or_dash, print_json, AppContext};
use crate::cli::HistoryArgs;
use crate::output;

#[derive(Tabled)]
struct AttemptRow {
    #[tabled(rename = "STARTED")]
    started: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "PACKAGE")]
    package: String,
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "USER")]
    user: String,
}

impl From<&InstallationAttempt> for AttemptRow {
    fn from(attempt: &InstallationAttempt) -> Self {
        Self {
            started: attempt.started.format("%Y-%m-%d %H:%M:%S").to_string(),
            action: attempt.action.to_string(),
            package: attempt.package_name.clone(),
            version: or_dash(&attempt.version).to_string(),
            status: attempt.status.to_string(),
            user: attempt.user.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn run(args: HistoryArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let log = ctx.attempt_log()?;

    let attempts = log.list(&AttemptQuery {
        package: args.package,
        limit: Some(args.limit),
    })?;

    if args.json {
        return print_json(&attempts);
    }

    if attempts.is_empty() {
        output::info("No installation attempts recorded");
        return Ok(());
    }

    let rows: Vec<AttemptRow> = attempts.iter().map(AttemptRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);

    if let Some(failed) = attempts
        .iter()
        .find(|a| a.status == AttemptStatus::Failed && !a.error.is_empty())
    {
        println!();
        output::warning(&format!("Latest failure ({}): {}", failed, failed.error));
    }
    Ok(())
}
