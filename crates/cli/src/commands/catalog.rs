use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::CommandResult;
use crate::render;

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[arg(long, conflicts_with = "demo", help = "JSON file with catalog rows (array of objects)")]
    pub catalog: Option<PathBuf>,
    #[arg(long, help = "Use the built-in demo catalog")]
    pub demo: bool,
    #[arg(long, help = "TOML file overlaying the built-in dictionary tables")]
    pub dictionary: Option<PathBuf>,
    #[arg(long, help = "Emit machine-readable JSON output")]
    pub json: bool,
}

pub fn run(args: &CatalogArgs) -> CommandResult {
    match execute(args) {
        Ok(output) => CommandResult::success(output),
        Err(error) => CommandResult::failure(2, format!("{error:#}")),
    }
}

fn execute(args: &CatalogArgs) -> Result<String> {
    let dictionary = super::load_dictionary(args.dictionary.as_deref())?;
    let rows = super::load_rows(args.demo, args.catalog.as_deref())?;
    let catalog = smeta_core::load_catalog(&rows, &dictionary)?;

    if args.json {
        return serde_json::to_string_pretty(&catalog).context("serializing catalog");
    }

    let mut lines =
        vec![format!("catalog: {} items ({} rows supplied)", catalog.len(), rows.len())];
    for item in &catalog {
        let category = item.category.as_deref().unwrap_or("без категории");
        lines.push(format!(
            "- [{}] {} — {} ₽/{} ({category})",
            item.sku,
            item.name,
            render::format_number(item.price),
            item.unit,
        ));
    }
    Ok(lines.join("\n"))
}
