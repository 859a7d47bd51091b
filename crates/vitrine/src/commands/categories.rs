//! Categories command

use anyhow::Result;
use camino::Utf8Path;
use serde_json::json;

use super::{print_json, AppContext};
use crate::cli::CategoriesArgs;
use crate::output;

pub async fn run(args: CategoriesArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let service = ctx.service()?;

    let categories = service.categories().await;
    let levels = service.certification_levels().await;

    if args.json {
        return print_json(&json!({
            "categories": categories,
            "certification_levels": levels,
        }));
    }

    output::header("Categories");
    if categories.is_empty() {
        println!("  -");
    }
    for category in &categories {
        println!("  {}", category);
    }

    output::header("Certification levels");
    for (level, description) in &levels {
        output::kv(level, description);
    }
    Ok(())
}
