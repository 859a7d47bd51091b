//! Refresh command

use anyhow::Result;
use camino::Utf8Path;

use super::AppContext;
use crate::output;

pub async fn run(config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let service = ctx.service()?;

    service.refresh();

    let spinner = output::spinner("Reloading registry index...");
    let packages = service.registry().list_packages().await;
    spinner.finish_and_clear();

    output::success(&format!(
        "Catalog refreshed ({} packages on {})",
        packages.len(),
        service.registry().base_url()
    ));
    Ok(())
}
