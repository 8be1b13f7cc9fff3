use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::domain::quote::LineItem;

static RE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|[\s\-:|]+\|$").expect("separator pattern must compile")
});

const MIN_ROW_CELLS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 3;

/// What a table column holds, decided once from its header cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRole {
    Description,
    Quantity,
    UnitPrice,
    Subtotal,
    Unknown,
}

impl ColumnRole {
    /// Substring heuristics, checked in this order so that "Unit Price" is a
    /// price and "Subtotal" a subtotal. Headers matching nothing are dropped.
    pub fn classify(header: &str) -> Self {
        let header = header.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|needle| header.contains(needle));

        if has(&["desc", "item", "service"]) {
            Self::Description
        } else if has(&["qty", "quantity"]) {
            Self::Quantity
        } else if has(&["unit", "price", "rate"]) {
            Self::UnitPrice
        } else if has(&["sub", "total", "amount"]) {
            Self::Subtotal
        } else {
            Self::Unknown
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineItemTable {
    pub items: Vec<LineItem>,
    pub total: Decimal,
}

/// Scans the reply for a pipe table and rebuilds its service rows.
///
/// Aggregate rows ("Total", "Subtotal") are skipped so the computed total is
/// not doubled, and so are rows too short to be a real line. An empty result
/// is left to the caller, which knows what to synthesise in its place.
pub fn extract_line_items(text: &str) -> LineItemTable {
    let mut table = LineItemTable::default();
    let mut columns: Vec<ColumnRole> = vec![
        ColumnRole::Description,
        ColumnRole::Quantity,
        ColumnRole::UnitPrice,
        ColumnRole::Subtotal,
    ];
    let mut in_table = false;
    let mut header_parsed = false;

    for line in text.lines() {
        let line = line.trim();

        if line.starts_with('|') && line.to_lowercase().contains("description") {
            in_table = true;
            columns = split_cells(line).map(ColumnRole::classify).collect();
            continue;
        }

        if RE_SEPARATOR.is_match(line) {
            header_parsed = true;
            continue;
        }

        if !(in_table && header_parsed) {
            continue;
        }

        if line.starts_with('|') {
            if let Some(item) = parse_row(line, &columns) {
                table.total = add_saturating(table.total, parse_amount(&item.subtotal));
                table.items.push(item);
            }
        } else if !line.is_empty() {
            in_table = false;
        }
    }

    table.total = table.total.normalize();
    table
}

/// Sums that would overflow pin the total at `Decimal::MAX`.
fn add_saturating(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        tracing::debug!(
            event_name = "quote.table.total_overflow",
            total = %total,
            amount = %amount,
            "line item total overflowed, saturating"
        );
        Decimal::MAX
    })
}

fn split_cells(line: &str) -> impl Iterator<Item = &str> {
    line.split('|').map(str::trim).filter(|cell| !cell.is_empty())
}

fn parse_row(line: &str, columns: &[ColumnRole]) -> Option<LineItem> {
    let cells: Vec<&str> = split_cells(line).collect();
    if cells.len() < MIN_ROW_CELLS {
        tracing::trace!(event_name = "quote.table.row_skipped", reason = "too_few_cells", line);
        return None;
    }

    if cells[0].to_lowercase().contains("total") {
        return None;
    }

    let mut item = LineItem {
        description: String::new(),
        quantity: "1".to_string(),
        unit_price: "-".to_string(),
        subtotal: "-".to_string(),
    };

    for (index, cell) in cells.iter().enumerate() {
        let value = cell.replace("**", "").trim().to_string();
        match columns.get(index).copied().unwrap_or(ColumnRole::Unknown) {
            ColumnRole::Description => item.description = value,
            ColumnRole::Quantity => item.quantity = value,
            ColumnRole::UnitPrice => item.unit_price = value,
            ColumnRole::Subtotal => item.subtotal = value,
            ColumnRole::Unknown => {}
        }
    }

    if item.subtotal == "-" && item.unit_price != "-" {
        item.subtotal = item.unit_price.clone();
    }

    if item.description.chars().count() < MIN_DESCRIPTION_CHARS {
        tracing::trace!(event_name = "quote.table.row_skipped", reason = "short_description", line);
        return None;
    }

    Some(item)
}

/// Reads the number out of a price cell such as `$1,200.50` or `PKR 4500/-`.
///
/// Everything but digits and dots is dropped and the longest numeric prefix
/// is parsed; an empty prefix counts as zero. Amounts beyond the `Decimal`
/// range saturate at `Decimal::MAX`.
pub fn parse_amount(cell: &str) -> Decimal {
    let digits: String = cell.chars().filter(|ch| ch.is_ascii_digit() || *ch == '.').collect();

    let mut end = 0;
    let mut seen_dot = false;
    for (index, ch) in digits.char_indices() {
        if ch == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = index + 1;
    }

    let numeric = digits[..end].trim_end_matches('.');
    if numeric.is_empty() {
        return Decimal::ZERO;
    }

    let numeric =
        if numeric.starts_with('.') { format!("0{numeric}") } else { numeric.to_string() };
    Decimal::from_str(&numeric).unwrap_or_else(|error| {
        tracing::trace!(
            event_name = "quote.table.amount_out_of_range",
            cell,
            error = %error,
            "amount does not fit a decimal, saturating"
        );
        Decimal::MAX
    })
}
