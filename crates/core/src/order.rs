//! Grouping of resolved lines into a priced order draft.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::{CatalogItem, CatalogItemId};
use crate::matching::ResolvedOrderLine;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderBucket {
    pub item_id: CatalogItemId,
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl OrderBucket {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * self.quantity
    }
}

/// Derived view over a resolved-line set; recomputed whenever the lines or
/// the catalog change, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GroupedOrder {
    /// First-seen order of `(item, unit)` buckets.
    pub buckets: Vec<OrderBucket>,
    /// Lines without a selected item, in original order.
    pub unresolved: Vec<ResolvedOrderLine>,
}

impl GroupedOrder {
    /// Unresolved lines never contribute to the total.
    pub fn total(&self) -> Decimal {
        self.buckets.iter().map(OrderBucket::line_total).sum()
    }
}

/// Merges lines selecting the same catalog item and unit, summing quantities.
/// A line whose selected id is missing from the catalog (stale selection
/// after a reload) is treated as unresolved.
pub fn group_order(lines: &[ResolvedOrderLine], catalog: &[CatalogItem]) -> GroupedOrder {
    let mut grouped = GroupedOrder::default();

    for line in lines {
        let item = line
            .selected_id
            .as_ref()
            .and_then(|id| catalog.iter().find(|item| &item.id == id));
        let Some(item) = item else {
            grouped.unresolved.push(line.clone());
            continue;
        };

        let unit = if line.request.unit.is_empty() {
            item.unit.clone()
        } else {
            line.request.unit.clone()
        };

        match grouped.buckets.iter_mut().find(|b| b.item_id == item.id && b.unit == unit) {
            Some(bucket) => bucket.quantity += line.request.quantity,
            None => grouped.buckets.push(OrderBucket {
                item_id: item.id.clone(),
                sku: item.sku.clone(),
                name: item.name.clone(),
                unit,
                quantity: line.request.quantity,
                unit_price: item.price,
            }),
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::group_order;
    use crate::catalog::{demo_rows, load_catalog, CatalogItem, CatalogItemId};
    use crate::dictionary::MatchDictionary;
    use crate::extract::OrderRequestLine;
    use crate::matching::ResolvedOrderLine;

    fn demo_catalog() -> Vec<CatalogItem> {
        load_catalog(&demo_rows(), &MatchDictionary::default()).expect("demo catalog loads")
    }

    fn line(selected: Option<&str>, quantity: i64, unit: &str) -> ResolvedOrderLine {
        ResolvedOrderLine {
            request: OrderRequestLine {
                raw: String::new(),
                item_text: String::new(),
                quantity: Decimal::from(quantity),
                unit: unit.to_owned(),
                unresolved: false,
            },
            normalized_query: String::new(),
            candidates: Vec::new(),
            selected_id: selected.map(|id| CatalogItemId(id.to_owned())),
            confidence: 80,
        }
    }

    fn osb6_id(catalog: &[CatalogItem]) -> String {
        catalog.iter().find(|item| item.sku == "OSB-6-1250x2500").expect("osb 6").id.0.clone()
    }

    #[test]
    fn same_item_and_unit_merge_into_one_bucket() {
        let catalog = demo_catalog();
        let id = osb6_id(&catalog);
        let lines = vec![line(Some(&id), 5, "лист"), line(Some(&id), 3, "лист")];

        let grouped = group_order(&lines, &catalog);
        assert_eq!(grouped.buckets.len(), 1);
        assert_eq!(grouped.buckets[0].quantity, Decimal::from(8));
        assert_eq!(grouped.total(), Decimal::from(980 * 8));
    }

    #[test]
    fn different_units_stay_in_separate_buckets() {
        let catalog = demo_catalog();
        let id = osb6_id(&catalog);
        let lines = vec![line(Some(&id), 5, "лист"), line(Some(&id), 2, "м2")];

        let grouped = group_order(&lines, &catalog);
        assert_eq!(grouped.buckets.len(), 2);
    }

    #[test]
    fn empty_line_unit_falls_back_to_catalog_unit() {
        let catalog = demo_catalog();
        let id = osb6_id(&catalog);
        let lines = vec![line(Some(&id), 4, "")];

        let grouped = group_order(&lines, &catalog);
        assert_eq!(grouped.buckets[0].unit, "лист");
    }

    #[test]
    fn unselected_and_stale_lines_land_in_unresolved() {
        let catalog = demo_catalog();
        let lines = vec![line(None, 1, "шт"), line(Some("GONE-99"), 2, "шт")];

        let grouped = group_order(&lines, &catalog);
        assert!(grouped.buckets.is_empty());
        assert_eq!(grouped.unresolved.len(), 2);
        assert_eq!(grouped.total(), Decimal::ZERO);
    }

    #[test]
    fn grouping_is_commutative_over_line_order() {
        let catalog = demo_catalog();
        let id = osb6_id(&catalog);
        let cement_id =
            catalog.iter().find(|item| item.sku == "CEM-M500-50").expect("cement").id.0.clone();
        let mut lines = vec![
            line(Some(&id), 5, "лист"),
            line(Some(&cement_id), 10, "мешок"),
            line(Some(&id), 3, "лист"),
            line(None, 1, "шт"),
        ];

        let forward = group_order(&lines, &catalog);
        lines.reverse();
        let backward = group_order(&lines, &catalog);

        let mut forward_buckets = forward.buckets.clone();
        let mut backward_buckets = backward.buckets.clone();
        forward_buckets.sort_by(|a, b| a.item_id.0.cmp(&b.item_id.0));
        backward_buckets.sort_by(|a, b| a.item_id.0.cmp(&b.item_id.0));

        assert_eq!(forward_buckets, backward_buckets);
        assert_eq!(forward.total(), backward.total());
        assert_eq!(forward.unresolved.len(), backward.unresolved.len());
    }
}
