//! Pure text stages: normalization, noise filtering, alias rewriting,
//! tokenization. Every function is total and deterministic over its inputs.

use std::sync::LazyLock;

use regex::Regex;

use crate::dictionary::MatchDictionary;

static NUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("numeric token pattern"));

/// Lowercases, folds characters through the dictionary replacement map,
/// replaces quote/bracket/slash/separator punctuation with spaces, unifies
/// dimension separators (`*`, `×`) to the token `x`, collapses whitespace,
/// and trims. Idempotent.
pub fn normalize(dictionary: &MatchDictionary, input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars().flat_map(char::to_lowercase) {
        let ch = dictionary.fold_char(ch);
        match ch {
            '*' | '×' => out.push_str(" x "),
            '"' | '\'' | '`' | '«' | '»' => out.push(' '),
            '(' | ')' | '[' | ']' | '{' | '}' => out.push(' '),
            '\\' | '/' => out.push(' '),
            ',' | ';' | ':' | '+' | '!' | '?' => out.push(' '),
            _ => out.push(ch),
        }
    }
    collapse_whitespace(&out)
}

/// Drops every whitespace-delimited token found in the noise-word set.
/// Token order is preserved; an empty result is valid.
pub fn remove_noise(dictionary: &MatchDictionary, text: &str) -> String {
    text.split_whitespace()
        .filter(|token| !dictionary.is_noise(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rewrites whole token runs through the dictionary's alias rules in their
/// priority order. Rules apply against the accumulating text, so a later rule
/// may act on the output of an earlier one; that layering is intentional.
pub fn apply_aliases(dictionary: &MatchDictionary, text: &str) -> String {
    let mut tokens: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
    for rule in dictionary.alias_rules() {
        let from: Vec<&str> = rule.from.split_whitespace().collect();
        if from.is_empty() {
            continue;
        }
        tokens = replace_token_run(&tokens, &from, &rule.to);
    }
    tokens.join(" ")
}

fn replace_token_run(tokens: &[String], from: &[&str], to: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let window_matches = i + from.len() <= tokens.len()
            && tokens[i..i + from.len()].iter().zip(from).all(|(token, expected)| token == expected);
        if window_matches {
            out.extend(to.split_whitespace().map(str::to_owned));
            i += from.len();
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }
    out
}

/// Normalizes and splits into non-empty tokens.
pub fn tokenize(dictionary: &MatchDictionary, input: &str) -> Vec<String> {
    normalize(dictionary, input).split_whitespace().map(str::to_owned).collect()
}

/// Numeric substrings of the text with `,` decimal separators folded to `.`.
pub fn numeric_tokens(text: &str) -> Vec<String> {
    NUM_RE.find_iter(text).map(|m| m.as_str().replace(',', ".")).collect()
}

fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_whitespace = false;
    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
                in_whitespace = true;
            }
        } else {
            in_whitespace = false;
            out.push(ch);
        }
    }
    out
}
