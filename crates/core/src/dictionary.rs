//! Dictionary tables driving normalization, noise filtering, alias rewriting,
//! and unit canonicalization.
//!
//! The dictionary is an explicit value passed into [`crate::MatchEngine`], not
//! process-wide state, so several catalogs with different vocabularies can
//! coexist in one process. A built-in Russian construction-materials
//! dictionary ships as the default; a TOML file can replace any of its tables.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::DictionaryError;
use crate::text::normalize;

/// Canonical fallback unit for requests that name no unit at all.
pub const PIECE_UNIT: &str = "шт";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasKind {
    /// Slang or misspelling of a product word ("усб" -> "осб").
    Product,
    /// Model code expanded to its product phrase ("а500с" -> "арматура а500с").
    BrandModel,
    /// Brand name folded to the product it stands for ("кнауф" -> "гкл").
    BrandToProduct,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AliasRule {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_alias_kind")]
    pub kind: AliasKind,
}

fn default_alias_kind() -> AliasKind {
    AliasKind::Product
}

#[derive(Clone, Debug)]
pub struct MatchDictionary {
    replace_chars: BTreeMap<char, char>,
    noise_words: HashSet<String>,
    aliases: Vec<AliasRule>,
    unit_forms: BTreeMap<String, Vec<String>>,
    unit_canon: HashMap<String, String>,
}

impl Default for MatchDictionary {
    fn default() -> Self {
        Self::from_tables(
            DEFAULT_REPLACE_CHARS.iter().copied().collect(),
            DEFAULT_NOISE_WORDS.iter().map(|w| (*w).to_owned()).collect(),
            default_alias_rules(),
            DEFAULT_UNITS
                .iter()
                .map(|(canonical, forms)| {
                    ((*canonical).to_owned(), forms.iter().map(|f| (*f).to_owned()).collect())
                })
                .collect(),
        )
    }
}

impl MatchDictionary {
    /// Builds a dictionary from raw tables. Alias rules are normalized with
    /// the dictionary's own character folding and ordered by descending
    /// priority, then by descending `from` length so longer phrases win ties.
    pub fn from_tables(
        replace_chars: BTreeMap<char, char>,
        noise_words: HashSet<String>,
        aliases: Vec<AliasRule>,
        unit_forms: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let mut dictionary = Self {
            replace_chars,
            noise_words: HashSet::new(),
            aliases: Vec::new(),
            unit_forms,
            unit_canon: HashMap::new(),
        };

        dictionary.noise_words =
            noise_words.iter().map(|word| normalize(&dictionary, word)).collect();

        let mut normalized_rules: Vec<AliasRule> = aliases
            .into_iter()
            .map(|rule| AliasRule {
                from: normalize(&dictionary, &rule.from),
                to: normalize(&dictionary, &rule.to),
                ..rule
            })
            .filter(|rule| !rule.from.is_empty())
            .collect();
        normalized_rules.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.from.chars().count().cmp(&a.from.chars().count()))
        });
        dictionary.aliases = normalized_rules;

        let mut unit_canon = HashMap::new();
        for (canonical, forms) in &dictionary.unit_forms {
            unit_canon.insert(normalize(&dictionary, canonical), canonical.clone());
            for form in forms {
                unit_canon.insert(normalize(&dictionary, form), canonical.clone());
            }
        }
        dictionary.unit_canon = unit_canon;

        dictionary
    }

    /// Loads a dictionary from a TOML document. Every table present in the
    /// document replaces the corresponding built-in table wholesale; absent
    /// tables keep their defaults.
    pub fn from_toml_str(document: &str) -> Result<Self, DictionaryError> {
        let patch: DictionaryPatch = toml::from_str(document)?;
        Ok(Self::from_patch(patch))
    }

    pub fn from_path(path: &Path) -> Result<Self, DictionaryError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| DictionaryError::ReadFile { path: path.to_path_buf(), source })?;
        let patch: DictionaryPatch = toml::from_str(&raw)
            .map_err(|source| DictionaryError::ParseFile { path: path.to_path_buf(), source })?;
        Ok(Self::from_patch(patch))
    }

    fn from_patch(patch: DictionaryPatch) -> Self {
        let defaults = Self::default();

        let replace_chars = patch
            .normalization
            .and_then(|normalization| normalization.replace_chars)
            .map(|map| {
                map.iter()
                    .filter_map(|(from, to)| {
                        Some((from.chars().next()?, to.chars().next()?))
                    })
                    .collect()
            })
            .unwrap_or(defaults.replace_chars);

        let noise_words = patch
            .noise_words
            .map(|words| words.into_iter().collect())
            .unwrap_or(defaults.noise_words);

        let aliases = patch.aliases.unwrap_or(defaults.aliases);
        let unit_forms = patch.units.unwrap_or(defaults.unit_forms);

        Self::from_tables(replace_chars, noise_words, aliases, unit_forms)
    }

    pub(crate) fn fold_char(&self, ch: char) -> char {
        self.replace_chars.get(&ch).copied().unwrap_or(ch)
    }

    pub fn is_noise(&self, token: &str) -> bool {
        self.noise_words.contains(token)
    }

    /// Alias rules in application order.
    pub fn alias_rules(&self) -> &[AliasRule] {
        &self.aliases
    }

    /// True when the word (after normalization) is a known unit spelling.
    pub fn knows_unit(&self, word: &str) -> bool {
        self.unit_canon.contains_key(&normalize(self, word))
    }

    /// Maps a unit word to its canonical code, falling back to the normalized
    /// word itself when unmapped and to [`PIECE_UNIT`] when empty.
    pub fn canonical_unit(&self, word: &str) -> String {
        let normalized = normalize(self, word);
        if normalized.is_empty() {
            return PIECE_UNIT.to_owned();
        }
        self.unit_canon.get(&normalized).cloned().unwrap_or(normalized)
    }

    pub fn canonical_units(&self) -> impl Iterator<Item = &str> {
        self.unit_forms.keys().map(String::as_str)
    }

    pub fn noise_word_count(&self) -> usize {
        self.noise_words.len()
    }

    pub fn unit_form_count(&self) -> usize {
        self.unit_canon.len()
    }
}

#[derive(Debug, Default, Deserialize)]
struct DictionaryPatch {
    normalization: Option<NormalizationPatch>,
    noise_words: Option<Vec<String>>,
    aliases: Option<Vec<AliasRule>>,
    units: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Default, Deserialize)]
struct NormalizationPatch {
    replace_chars: Option<BTreeMap<String, String>>,
}

const DEFAULT_REPLACE_CHARS: &[(char, char)] = &[('ё', 'е')];

const DEFAULT_NOISE_WORDS: &[&str] = &[
    "привет",
    "здравствуйте",
    "добрый",
    "день",
    "пожалуйста",
    "спасибо",
    "надо",
    "нужно",
    "нужен",
    "нужна",
    "нужны",
    "дай",
    "дайте",
    "мне",
    "нам",
    "еще",
    "хочу",
    "купить",
    "заказать",
    "бы",
    "срочно",
];

const DEFAULT_UNITS: &[(&str, &[&str])] = &[
    ("шт", &["шт", "шт.", "штук", "штука", "штуки"]),
    ("лист", &["лист", "листа", "листов"]),
    ("пачка", &["пачка", "пачки", "пачек", "уп", "упак", "упаковка", "упаковки", "упаковок"]),
    ("мешок", &["мешок", "мешка", "мешков"]),
    ("канистра", &["канистра", "канистры", "канистр"]),
    ("рулон", &["рулон", "рулона", "рулонов"]),
    ("м2", &["м2", "м²", "кв.м"]),
    ("м3", &["м3", "м³", "куб.м"]),
    ("кг", &["кг", "килограмм", "килограмма", "килограммов"]),
    ("л", &["л", "литр", "литра", "литров"]),
    ("м", &["м", "мп", "метр", "метра", "метров", "пог.м"]),
];

fn default_alias_rules() -> Vec<AliasRule> {
    fn rule(from: &str, to: &str, priority: i32, kind: AliasKind) -> AliasRule {
        AliasRule { from: from.to_owned(), to: to.to_owned(), priority, kind }
    }

    vec![
        rule("минеральная вата", "минвата", 9, AliasKind::Product),
        rule("каменная вата", "минвата", 9, AliasKind::Product),
        rule("усб", "осб", 8, AliasKind::Product),
        rule("юсб", "осб", 8, AliasKind::Product),
        rule("гипсак", "гкл", 8, AliasKind::Product),
        rule("озб", "осб", 7, AliasKind::Product),
        rule("гипрок", "гкл", 7, AliasKind::BrandToProduct),
        rule("а500с", "арматура а500с", 6, AliasKind::BrandModel),
        rule("кнауф", "гкл", 5, AliasKind::BrandToProduct),
        rule("технониколь", "минвата", 5, AliasKind::BrandToProduct),
    ]
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{AliasKind, MatchDictionary, PIECE_UNIT};

    #[test]
    fn default_dictionary_canonicalizes_unit_spellings() {
        let dictionary = MatchDictionary::default();

        assert_eq!(dictionary.canonical_unit("мешков"), "мешок");
        assert_eq!(dictionary.canonical_unit("ПАЧЕК"), "пачка");
        assert_eq!(dictionary.canonical_unit("м²"), "м2");
        assert_eq!(dictionary.canonical_unit("шт."), "шт");
    }

    #[test]
    fn unmapped_unit_falls_back_to_normalized_word_then_piece() {
        let dictionary = MatchDictionary::default();

        assert_eq!(dictionary.canonical_unit("Поддонов"), "поддонов");
        assert_eq!(dictionary.canonical_unit(""), PIECE_UNIT);
        assert_eq!(dictionary.canonical_unit("  "), PIECE_UNIT);
    }

    #[test]
    fn alias_rules_are_ordered_by_priority_then_length() {
        let dictionary = MatchDictionary::default();
        let rules = dictionary.alias_rules();

        for pair in rules.windows(2) {
            let ordered = pair[0].priority > pair[1].priority
                || (pair[0].priority == pair[1].priority
                    && pair[0].from.chars().count() >= pair[1].from.chars().count());
            assert!(ordered, "rules out of order: {:?} before {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn toml_patch_replaces_only_present_tables() {
        let dictionary = MatchDictionary::from_toml_str(
            r#"
noise_words = ["ну"]

[[aliases]]
from = "ДВП"
to = "оргалит"
priority = 3
kind = "product"
"#,
        )
        .expect("patch should parse");

        assert!(dictionary.is_noise("ну"));
        assert!(!dictionary.is_noise("привет"));
        assert_eq!(dictionary.alias_rules().len(), 1);
        assert_eq!(dictionary.alias_rules()[0].from, "двп");
        assert_eq!(dictionary.alias_rules()[0].kind, AliasKind::Product);
        // units table untouched
        assert_eq!(dictionary.canonical_unit("листов"), "лист");
    }

    #[test]
    fn dictionary_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
[units]
"пал" = ["пал", "паллета", "паллет"]
"#
        )
        .expect("write dictionary");

        let dictionary = MatchDictionary::from_path(file.path()).expect("load dictionary");
        assert_eq!(dictionary.canonical_unit("паллет"), "пал");
        // replaced wholesale, defaults gone
        assert_eq!(dictionary.canonical_unit("мешков"), "мешков");
    }

    #[test]
    fn invalid_toml_surfaces_parse_error() {
        let error = MatchDictionary::from_toml_str("noise_words = 5").unwrap_err();
        assert!(error.to_string().contains("could not parse"));
    }
}
