//! Info command

use anyhow::Result;
use camino::Utf8Path;
use vitrine_catalog::installer::config_snippet;
use vitrine_core::Error;

use super::{or_dash, print_json, AppContext};
use crate::cli::InfoArgs;
use crate::output;

/// Number of most recent releases shown
const RECENT_RELEASES: usize = 10;

pub async fn run(args: InfoArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let service = ctx.service()?;

    let plugin = service
        .get_plugin(&args.name)
        .await
        .ok_or_else(|| Error::plugin_not_found(&args.name))?;

    if args.json {
        return print_json(&plugin);
    }

    output::header(&plugin.name);
    output::kv("Version", &plugin.version);
    output::kv("Summary", or_dash(&plugin.summary));
    output::kv("Author", or_dash(&plugin.author));
    output::kv("License", or_dash(&plugin.license));
    output::kv("Homepage", or_dash(&plugin.homepage));
    if !plugin.keywords.is_empty() {
        let keywords: Vec<&str> = plugin.keywords.iter().map(String::as_str).collect();
        output::kv("Keywords", &keywords.join(", "));
    }
    if !plugin.requires_python.is_empty() {
        output::kv("Requires Python", &plugin.requires_python);
    }

    output::header("Catalog");
    output::kv("Category", &plugin.category);
    output::kv("Certification", plugin.certification.as_str());
    if !plugin.tags.is_empty() {
        output::kv("Tags", &plugin.tags.join(", "));
    }
    output::kv("Recommended", if plugin.recommended { "yes" } else { "no" });
    if !plugin.notes.is_empty() {
        output::kv("Notes", &plugin.notes);
    }
    if !plugin.documentation_url.is_empty() {
        output::kv("Documentation", &plugin.documentation_url);
    }
    if !plugin.replacement.is_empty() {
        output::warning(&format!("Deprecated; use {} instead", plugin.replacement));
    }

    output::header("Compatibility");
    output::kv("Host version", &service.checker().host_version().to_string());
    output::kv("Supported range", &format!(
        "{} - {}",
        or_dash(&plugin.min_version),
        or_dash(&plugin.max_version)
    ));
    output::kv(
        "Verdict",
        &format!(
            "{} ({})",
            output::verdict_mark(plugin.compatible),
            plugin.compatibility_source
        ),
    );
    if let Some(reason) = &plugin.compatibility_reason {
        output::kv("Reason", reason);
    }
    if let Some(hint) = &plugin.readme_version_hint {
        output::kv("Description mentions", &format!("NetBox {}", hint));
    }

    output::header("Status");
    match &plugin.installed_version {
        Some(installed) => {
            output::kv("Installed", installed);
            output::kv("Activated", if plugin.activated { "yes" } else { "no" });
            if plugin.upgrade_available {
                output::info(&format!(
                    "Upgrade available: {} → {}",
                    installed, plugin.version
                ));
            }
            if !plugin.activated {
                println!();
                output::info("Enable it in configuration.py:");
                output::block(&config_snippet(&plugin.name));
            }
        }
        None => output::kv("Installed", "no"),
    }

    if !plugin.releases.is_empty() {
        output::header("Recent releases");
        for release in plugin.releases.iter().rev().take(RECENT_RELEASES) {
            println!("  {}", release);
        }
    }

    Ok(())
}
