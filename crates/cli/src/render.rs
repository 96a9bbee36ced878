//! Human-readable rendering of a grouped order draft.

use rust_decimal::Decimal;
use smeta_core::{GroupedOrder, ResolvedOrderLine};

/// Selections below this confidence are worth a human glance.
const SHAKY_CONFIDENCE: u8 = 60;

/// One-line count of how the request lines fared, for quick review.
pub fn render_summary(lines: &[ResolvedOrderLine]) -> String {
    let resolved = lines.iter().filter(|line| line.is_resolved()).count();
    let shaky = lines
        .iter()
        .filter(|line| line.is_resolved() && line.confidence < SHAKY_CONFIDENCE)
        .count();
    format!(
        "строк: {} · уверенно: {} · неуверенно: {} · не распознано: {}",
        lines.len(),
        resolved - shaky,
        shaky,
        lines.len() - resolved,
    )
}

pub fn render_draft(order: &GroupedOrder) -> String {
    if order.buckets.is_empty() && order.unresolved.is_empty() {
        return "пустой запрос".to_owned();
    }

    let mut lines = Vec::new();
    for (index, bucket) in order.buckets.iter().enumerate() {
        lines.push(format!(
            "{}. {} [{}] — {} {} × {} ₽ = {} ₽",
            index + 1,
            bucket.name,
            bucket.sku,
            format_number(bucket.quantity),
            bucket.unit,
            format_number(bucket.unit_price),
            format_number(bucket.line_total()),
        ));
    }

    if !order.unresolved.is_empty() {
        lines.push(String::new());
        lines.push("НЕ РАСПОЗНАНО:".to_owned());
        for line in &order.unresolved {
            let hint = line
                .candidates
                .first()
                .map(|candidate| format!(" (возможно: {}, {}%)", candidate.name, candidate.confidence))
                .unwrap_or_default();
            lines.push(format!("- {}{hint}", line.request.raw));
        }
    }

    lines.push(String::new());
    lines.push(format!("ИТОГО: {} ₽", format_number(order.total())));
    lines.join("\n")
}

/// Space-grouped thousands with a decimal comma, trailing zeros dropped.
pub fn format_number(value: Decimal) -> String {
    let text = value.normalize().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole.to_owned(), Some(fraction.to_owned())),
        None => (text, None),
    };
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest.to_owned()),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (offset, digit) in digits.chars().enumerate() {
        if offset > 0 && (digits.len() - offset) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped},{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
