//! List command

use anyhow::Result;
use camino::Utf8Path;
use tabled::{
    settings::{object::Columns, Modify, Style, Width},
    Table, Tabled,
};
use vitrine_catalog::PluginFilter;
use vitrine_core::types::{Certification, PluginRecord};

use super::{or_dash, print_json, AppContext};
use crate::cli::ListArgs;
use crate::output;

#[derive(Tabled)]
struct PluginRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "INSTALLED")]
    installed: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "CERTIFICATION")]
    certification: String,
    #[tabled(rename = "COMPAT")]
    compatible: String,
    #[tabled(rename = "SUMMARY")]
    summary: String,
}

impl PluginRow {
    fn from_record(plugin: &PluginRecord) -> Self {
        let installed = match &plugin.installed_version {
            Some(v) if plugin.upgrade_available => format!("{} ↑", v),
            Some(v) if plugin.activated => format!("{} (active)", v),
            Some(v) => v.clone(),
            None => "-".to_string(),
        };

        let mut name = plugin.name.clone();
        if plugin.featured {
            name.push_str(" ★");
        }

        Self {
            name,
            version: plugin.version.clone(),
            installed,
            category: plugin.category.clone(),
            certification: plugin.certification.to_string(),
            compatible: output::verdict_mark(plugin.compatible),
            summary: or_dash(&plugin.summary).to_string(),
        }
    }
}

pub async fn run(args: ListArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let service = ctx.service()?;

    let include_uncurated = if args.all {
        true
    } else if args.curated_only {
        false
    } else {
        ctx.config.show_uncurated
    };

    let filter = PluginFilter {
        category: args.category,
        certification: args.certification.as_deref().map(Certification::from_label),
        status: args.status,
        compatibility: args.compatibility,
        search: args.search,
    };

    let spinner = (!args.json).then(|| output::spinner("Loading plugin catalog..."));
    let plugins = service.list_plugins(include_uncurated).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let plugins = filter.apply(plugins);

    if args.json {
        return print_json(&plugins);
    }

    if plugins.is_empty() {
        output::warning("No plugins found");
        return Ok(());
    }

    output::header(&format!(
        "Plugins for NetBox {}",
        service.checker().host_version()
    ));
    println!();

    let rows: Vec<PluginRow> = plugins.iter().map(PluginRow::from_record).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::sharp())
        .with(Modify::new(Columns::new(6..7)).with(Width::wrap(50).keep_words(true))); // summary
    println!("{}", table);

    let incompatible = plugins.iter().filter(|p| !p.compatible).count();
    println!();
    output::info(&format!(
        "{} plugins, {} incompatible with this host",
        plugins.len(),
        incompatible
    ));
    Ok(())
}
