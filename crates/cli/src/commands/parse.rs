use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use smeta_core::{
    group_order, GroupedOrder, MatchEngine, MatcherOptions, ResolvedOrderLine, ScoringWeights,
};

use super::CommandResult;
use crate::render;

#[derive(Debug, Args)]
pub struct ParseArgs {
    #[arg(long, conflicts_with = "demo", help = "JSON file with catalog rows (array of objects)")]
    pub catalog: Option<PathBuf>,
    #[arg(long, help = "Use the built-in demo catalog")]
    pub demo: bool,
    #[arg(long, conflicts_with = "text", help = "Read order text from a file (`-` for stdin)")]
    pub input: Option<PathBuf>,
    #[arg(long, help = "Order text given inline")]
    pub text: Option<String>,
    #[arg(long, help = "TOML file overlaying the built-in dictionary tables")]
    pub dictionary: Option<PathBuf>,
    #[arg(long, help = "Score with the stricter weight profile")]
    pub strict: bool,
    #[arg(long, help = "Also split request lines on conjunctions and commas")]
    pub split_conjunctions: bool,
    #[arg(long, help = "Emit machine-readable JSON instead of a draft")]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ParseReport {
    lines: Vec<ResolvedOrderLine>,
    order: GroupedOrder,
}

pub fn run(args: &ParseArgs) -> CommandResult {
    match execute(args) {
        Ok(output) => CommandResult::success(output),
        Err(error) => CommandResult::failure(2, format!("{error:#}")),
    }
}

fn execute(args: &ParseArgs) -> Result<String> {
    let dictionary = super::load_dictionary(args.dictionary.as_deref())?;
    let rows = super::load_rows(args.demo, args.catalog.as_deref())?;
    let text = read_order_text(args)?;

    let options = MatcherOptions {
        weights: if args.strict { ScoringWeights::STRICT } else { ScoringWeights::BALANCED },
        split_conjunctions: args.split_conjunctions,
        ..MatcherOptions::default()
    };
    let engine = MatchEngine::new(dictionary, options);
    let catalog = engine.load_catalog(&rows)?;

    let lines = engine.match_order(&text, &catalog);
    let order = group_order(&lines, &catalog);

    if args.json {
        let report = ParseReport { lines, order };
        return serde_json::to_string_pretty(&report).context("serializing parse report");
    }
    Ok(format!("{}\n\n{}", render::render_summary(&lines), render::render_draft(&order)))
}

fn read_order_text(args: &ParseArgs) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    match &args.input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("reading order text from {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading order text from stdin")?;
            Ok(buffer)
        }
    }
}
