//! Line splitting and trailing quantity/unit extraction.
//!
//! Both operate on raw line text: stripping the quantity before any
//! normalization keeps decimal separators and unit spellings intact.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::dictionary::{MatchDictionary, PIECE_UNIT};

/// Trailing `<number> <unit-word>` anchored to the end of the line. The unit
/// word must start with a letter so a bare trailing number never strips.
static TRAILING_QTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(\d+(?:[.,]\d+)?)\s*(\p{L}[\p{L}\p{N}.²³-]*)\s*$")
        .expect("trailing quantity pattern")
});

static CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:и|плюс)\s+|,").expect("clause separator pattern"));

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderRequestLine {
    /// Original line as the customer wrote it.
    pub raw: String,
    /// Line text with the quantity pattern stripped.
    pub item_text: String,
    pub quantity: Decimal,
    /// Canonical unit code; [`PIECE_UNIT`] when the line names none.
    pub unit: String,
    /// True when no quantity pattern matched (or it consumed the whole line).
    pub unresolved: bool,
}

/// Splits a dirty-text block into logical request lines: `\r` counts as a
/// newline, semicolons separate lines, empty lines are dropped. With
/// `split_conjunctions` each line is further split on `и`/`плюс`/commas.
pub fn split_lines(dirty_text: &str, split_conjunctions: bool) -> Vec<String> {
    let unified = dirty_text.replace('\r', "\n").replace(';', "\n");
    let mut lines = Vec::new();
    for line in unified.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if split_conjunctions {
            for clause in CLAUSE_RE.split(line) {
                let clause = clause.trim();
                if !clause.is_empty() {
                    lines.push(clause.to_owned());
                }
            }
        } else {
            lines.push(line.to_owned());
        }
    }
    lines
}

/// Extracts the trailing quantity and unit from one raw line.
///
/// A unit word glued to the number without whitespace is accepted only when
/// the dictionary knows it ("8шт"); otherwise the token is a size code
/// ("9мм") and the line keeps it.
pub fn extract_request(dictionary: &MatchDictionary, line: &str) -> OrderRequestLine {
    let raw = line.trim().to_owned();

    let Some(captures) = TRAILING_QTY_RE.captures(&raw) else {
        return unresolved_line(raw);
    };
    let (Some(number), Some(word)) = (captures.get(1), captures.get(2)) else {
        return unresolved_line(raw);
    };

    let known_unit = dictionary.knows_unit(word.as_str());
    let glued = word.start() == number.end();
    if glued && !known_unit {
        return unresolved_line(raw);
    }

    let quantity = parse_quantity(number.as_str());
    let unit = dictionary.canonical_unit(word.as_str());
    let item_text = raw[..number.start()]
        .trim_end()
        .trim_end_matches([',', '.', ';', ':', '-', '—'])
        .trim_end()
        .to_owned();

    if item_text.is_empty() {
        // the pattern consumed the whole line; keep it as the item text
        return OrderRequestLine { item_text: raw.clone(), raw, quantity, unit, unresolved: true };
    }

    OrderRequestLine { raw, item_text, quantity, unit, unresolved: false }
}

fn unresolved_line(raw: String) -> OrderRequestLine {
    OrderRequestLine {
        item_text: raw.clone(),
        raw,
        quantity: Decimal::ONE,
        unit: PIECE_UNIT.to_owned(),
        unresolved: true,
    }
}

/// Non-finite, non-positive, or unparsable quantities recover to 1.
fn parse_quantity(raw: &str) -> Decimal {
    let cleaned = raw.replace(',', ".");
    match cleaned.parse::<Decimal>() {
        Ok(value) if value > Decimal::ZERO => value,
        _ => Decimal::ONE,
    }
}
