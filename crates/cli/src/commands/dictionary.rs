use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use smeta_core::AliasRule;

use super::CommandResult;

#[derive(Debug, Args)]
pub struct DictionaryArgs {
    #[arg(long, help = "TOML file overlaying the built-in dictionary tables")]
    pub dictionary: Option<PathBuf>,
    #[arg(long, help = "Emit machine-readable JSON output")]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DictionarySummary<'a> {
    noise_words: usize,
    unit_forms: usize,
    canonical_units: Vec<&'a str>,
    aliases: &'a [AliasRule],
}

pub fn run(args: &DictionaryArgs) -> CommandResult {
    match execute(args) {
        Ok(output) => CommandResult::success(output),
        Err(error) => CommandResult::failure(2, format!("{error:#}")),
    }
}

fn execute(args: &DictionaryArgs) -> Result<String> {
    let dictionary = super::load_dictionary(args.dictionary.as_deref())?;

    let summary = DictionarySummary {
        noise_words: dictionary.noise_word_count(),
        unit_forms: dictionary.unit_form_count(),
        canonical_units: dictionary.canonical_units().collect(),
        aliases: dictionary.alias_rules(),
    };

    if args.json {
        return serde_json::to_string_pretty(&summary).context("serializing dictionary summary");
    }

    let mut lines = vec![
        format!("noise words: {}", summary.noise_words),
        format!(
            "units: {} canonical ({} spellings): {}",
            summary.canonical_units.len(),
            summary.unit_forms,
            summary.canonical_units.join(", "),
        ),
        format!("aliases: {} rules, in application order:", summary.aliases.len()),
    ];
    for rule in summary.aliases {
        lines.push(format!(
            "- {} -> {} (priority {}, {:?})",
            rule.from, rule.to, rule.priority, rule.kind
        ));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{execute, DictionaryArgs};

    #[test]
    fn built_in_tables_are_summarized() {
        let output = execute(&DictionaryArgs { dictionary: None, json: false })
            .expect("defaults load");

        assert!(output.contains("noise words: 21"));
        assert!(output.contains("усб -> осб"));
        assert!(output.contains("мешок"));
    }

    #[test]
    fn overlay_file_replaces_listed_tables() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "noise_words = [\"ну\", \"вот\"]").expect("write dictionary");

        let output = execute(&DictionaryArgs {
            dictionary: Some(file.path().to_path_buf()),
            json: false,
        })
        .expect("overlay loads");
        assert!(output.contains("noise words: 2"));
        // aliases table untouched by the overlay
        assert!(output.contains("усб -> осб"));
    }

    #[test]
    fn json_summary_lists_alias_rules() {
        let output =
            execute(&DictionaryArgs { dictionary: None, json: true }).expect("defaults load");
        let summary: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert!(summary["aliases"].as_array().map(Vec::len).unwrap_or(0) >= 10);
    }
}
