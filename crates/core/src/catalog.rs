//! Catalog loading: maps already-parsed tabular rows onto [`CatalogItem`]s,
//! detecting which column feeds each logical field from a priority list of
//! known header spellings.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dictionary::{MatchDictionary, PIECE_UNIT};
use crate::errors::CatalogError;
use crate::text::normalize;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogItemId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogItem {
    pub id: CatalogItemId,
    pub sku: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub unit: String,
    pub price: Decimal,
    pub category: Option<String>,
    /// Normalized concatenation of name, aliases, category, and SKU.
    pub search_blob: String,
    /// Token set of `search_blob`; non-empty whenever `name` is non-empty.
    pub tokens: Vec<String>,
}

/// Known header spellings per logical field, in detection priority order.
const COLUMN_ALIASES: &[(Column, &[&str])] = &[
    (Column::Sku, &["sku", "артикул", "код", "id"]),
    (Column::Name, &["name", "товар", "наименование", "title", "позиция"]),
    (Column::Aliases, &["aliases", "синонимы", "keywords", "ключи", "alias"]),
    (Column::Unit, &["unit", "ед", "единица", "едизм", "единицаизмерения", "ед."]),
    (Column::Price, &["price", "цена", "стоимость"]),
    (Column::Category, &["category", "категория", "group", "группа"]),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Column {
    Sku,
    Name,
    Aliases,
    Unit,
    Price,
    Category,
}

#[derive(Debug, Default)]
struct ColumnMap {
    sku: Option<String>,
    name: Option<String>,
    aliases: Option<String>,
    unit: Option<String>,
    price: Option<String>,
    category: Option<String>,
}

/// Builds the catalog from externally supplied rows (each a header -> cell
/// mapping). Header names are matched against known spellings first exactly,
/// then by substring. Rows without a resolved non-empty name are dropped;
/// when no row survives the whole load fails.
pub fn load_catalog(
    rows: &[HashMap<String, String>],
    dictionary: &MatchDictionary,
) -> Result<Vec<CatalogItem>, CatalogError> {
    let normalized_rows: Vec<HashMap<String, String>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|(key, value)| (normalize(dictionary, key), value.trim().to_owned()))
                .collect()
        })
        .collect();

    let Some(first_row) = normalized_rows.first() else {
        return Err(CatalogError::NoUsableRows);
    };
    let columns = detect_columns(first_row, dictionary);

    let items: Vec<CatalogItem> = normalized_rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| build_item(row, index, &columns, dictionary))
        .collect();

    if items.is_empty() {
        return Err(CatalogError::NoUsableRows);
    }

    info!(items = items.len(), rows = rows.len(), "catalog loaded");
    Ok(items)
}

fn detect_columns(first_row: &HashMap<String, String>, dictionary: &MatchDictionary) -> ColumnMap {
    let keys: Vec<&String> = first_row.keys().collect();
    let mut columns = ColumnMap::default();

    for (column, candidates) in COLUMN_ALIASES {
        let detected = detect_column(&keys, candidates, dictionary);
        match column {
            Column::Sku => columns.sku = detected,
            Column::Name => columns.name = detected,
            Column::Aliases => columns.aliases = detected,
            Column::Unit => columns.unit = detected,
            Column::Price => columns.price = detected,
            Column::Category => columns.category = detected,
        }
    }

    columns
}

fn detect_column(
    keys: &[&String],
    candidates: &[&str],
    dictionary: &MatchDictionary,
) -> Option<String> {
    for candidate in candidates {
        let wanted = normalize(dictionary, candidate);
        if let Some(key) = keys.iter().find(|key| ***key == wanted) {
            return Some((*key).clone());
        }
    }
    for candidate in candidates {
        let wanted = normalize(dictionary, candidate);
        if let Some(key) = keys.iter().find(|key| key.contains(wanted.as_str())) {
            return Some((*key).clone());
        }
    }
    None
}

fn build_item(
    row: &HashMap<String, String>,
    index: usize,
    columns: &ColumnMap,
    dictionary: &MatchDictionary,
) -> Option<CatalogItem> {
    let name = cell(row, &columns.name);
    if name.is_empty() {
        return None;
    }

    let aliases: Vec<String> = cell(row, &columns.aliases)
        .split([';', '|', ','])
        .map(str::trim)
        .filter(|alias| !alias.is_empty())
        .map(str::to_owned)
        .collect();

    let sku_cell = cell(row, &columns.sku);
    let sku = if sku_cell.is_empty() { format!("ROW-{}", index + 1) } else { sku_cell };

    let unit_cell = cell(row, &columns.unit);
    let unit = if unit_cell.is_empty() { PIECE_UNIT.to_owned() } else { unit_cell };

    let category_cell = cell(row, &columns.category);
    let category = (!category_cell.is_empty()).then_some(category_cell);

    let mut blob_parts = vec![name.clone()];
    blob_parts.extend(aliases.iter().cloned());
    blob_parts.extend(category.iter().cloned());
    blob_parts.push(sku.clone());
    let search_blob = normalize(dictionary, &blob_parts.join(" "));
    let tokens = search_blob.split_whitespace().map(str::to_owned).collect();

    Some(CatalogItem {
        id: CatalogItemId(format!("{sku}-{index}")),
        sku,
        name,
        aliases,
        unit,
        price: parse_price(&cell(row, &columns.price)),
        category,
        search_blob,
        tokens,
    })
}

fn cell(row: &HashMap<String, String>, column: &Option<String>) -> String {
    column.as_ref().and_then(|key| row.get(key)).cloned().unwrap_or_default()
}

/// Unparsable or negative prices recover to zero: a draft with a missing
/// price beats a rejected catalog row.
fn parse_price(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();
    match Decimal::from_str(&cleaned) {
        Ok(value) if value >= Decimal::ZERO => value,
        _ => Decimal::ZERO,
    }
}

/// The demo assortment rows used by the CLI `--demo` flag and the test suite.
pub fn demo_rows() -> Vec<HashMap<String, String>> {
    const HEADERS: [&str; 6] = ["sku", "name", "aliases", "unit", "price", "category"];
    const ROWS: [[&str; 6]; 10] = [
        ["MW-50-300", "Минвата 50мм пачка 3м2", "минвата;вата;утеплитель", "пачка", "1450", "Утеплитель"],
        ["OSB-6-1250x2500", "OSB-3 6мм 1250x2500", "осб;усб;osb", "лист", "980", "Листовые"],
        ["OSB-9-1250x2500", "OSB-3 9мм 1250x2500", "осб;усб;osb", "лист", "1220", "Листовые"],
        ["GKL-12-2500", "ГКЛ 12.5мм 1200x2500", "гкл;гипсокартон", "лист", "420", "Листовые"],
        ["CEM-M500-50", "Цемент М500 50кг", "цемент;портландцемент", "мешок", "650", "Сухие смеси"],
        ["SAND-40", "Пескобетон М300 40кг", "пескобетон;м300", "мешок", "310", "Сухие смеси"],
        ["PLY-12-FK", "Фанера ФК 12мм 1525x1525", "фанера", "лист", "1350", "Листовые"],
        ["REBAR-12", "Арматура А500С 12мм 11.7м", "арматура;а500с", "шт", "890", "Металл"],
        ["BLOCK-D500", "Газоблок D500 625x250x300", "газоблок;блок", "шт", "285", "Блоки"],
        ["PRIMER-10", "Грунтовка глубокого проникновения 10л", "грунтовка", "канистра", "920", "ЛКМ"],
    ];

    ROWS.iter()
        .map(|row| {
            HEADERS
                .iter()
                .zip(row.iter())
                .map(|(header, value)| ((*header).to_owned(), (*value).to_owned()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;

    use super::{demo_rows, load_catalog, parse_price};
    use crate::dictionary::MatchDictionary;
    use crate::errors::CatalogError;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn demo_rows_load_into_ten_items() {
        let dictionary = MatchDictionary::default();
        let catalog = load_catalog(&demo_rows(), &dictionary).expect("demo catalog loads");

        assert_eq!(catalog.len(), 10);
        let cement = catalog.iter().find(|item| item.sku == "CEM-M500-50").expect("cement row");
        assert_eq!(cement.unit, "мешок");
        assert_eq!(cement.price, Decimal::from(650));
        assert_eq!(cement.aliases, vec!["цемент", "портландцемент"]);
        assert!(cement.tokens.contains(&"цемент".to_owned()));
        assert!(cement.tokens.contains(&"м500".to_owned()));
    }

    #[test]
    fn russian_headers_are_detected_by_alias() {
        let dictionary = MatchDictionary::default();
        let rows = vec![row(&[
            ("Наименование", "Цемент М400"),
            ("Артикул", "CEM-400"),
            ("Цена, руб", "540"),
            ("Ед.изм", "мешок"),
        ])];

        let catalog = load_catalog(&rows, &dictionary).expect("catalog loads");
        assert_eq!(catalog[0].sku, "CEM-400");
        assert_eq!(catalog[0].name, "Цемент М400");
        // "цена руб" matched by substring against "цена"
        assert_eq!(catalog[0].price, Decimal::from(540));
        assert_eq!(catalog[0].unit, "мешок");
    }

    #[test]
    fn rows_without_name_are_dropped_and_defaults_fill_in() {
        let dictionary = MatchDictionary::default();
        let rows = vec![
            row(&[("name", ""), ("price", "100")]),
            row(&[("name", "Сетка кладочная"), ("price", "не знаю")]),
        ];

        let catalog = load_catalog(&rows, &dictionary).expect("one row survives");
        assert_eq!(catalog.len(), 1);
        let item = &catalog[0];
        assert_eq!(item.sku, "ROW-2");
        assert_eq!(item.id.0, "ROW-2-1");
        assert_eq!(item.unit, "шт");
        assert_eq!(item.price, Decimal::ZERO);
        assert!(!item.tokens.is_empty());
    }

    #[test]
    fn all_nameless_rows_fail_the_load() {
        let dictionary = MatchDictionary::default();
        let rows = vec![row(&[("price", "100")]), row(&[("price", "200")])];

        assert!(matches!(
            load_catalog(&rows, &dictionary),
            Err(CatalogError::NoUsableRows)
        ));
        assert!(matches!(load_catalog(&[], &dictionary), Err(CatalogError::NoUsableRows)));
    }

    #[test]
    fn price_parsing_recovers_to_zero() {
        assert_eq!(parse_price("1 450"), Decimal::from(1450));
        assert_eq!(parse_price("310,50"), Decimal::new(31050, 2));
        assert_eq!(parse_price("договорная"), Decimal::ZERO);
        assert_eq!(parse_price("-5"), Decimal::ZERO);
        assert_eq!(parse_price(""), Decimal::ZERO);
    }
}
