use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::currency::Currency;

/// Placeholder for any field that neither the reply nor the form supplied.
pub const NOT_AVAILABLE: &str = "N/A";

/// Terms shown when the reply carries no terms section.
pub const DEFAULT_TERMS: [&str; 3] = [
    "This quote is valid for 30 days from the date issued.",
    "Payment is due upon completion of service.",
    "All repairs and parts are guaranteed for 90 days post-service.",
];

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub building_type: String,
    pub elevator_brand: String,
    pub floors: String,
    pub service_type: String,
    pub urgency: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Emergency,
    High,
    Standard,
}

impl UrgencyLevel {
    /// iCalendar `PRIORITY` value (1 is highest).
    pub fn calendar_priority(self) -> u8 {
        match self {
            Self::Emergency => 1,
            Self::High => 3,
            Self::Standard => 5,
        }
    }
}

impl ServiceInfo {
    /// Service type without a leading "Emergency" qualifier; urgency is shown
    /// separately so the word would otherwise appear twice.
    pub fn display_service_type(&self) -> &str {
        let trimmed = self.service_type.trim_start();
        let Some(head) = trimmed.get(..9) else {
            return trimmed;
        };
        if head.eq_ignore_ascii_case("emergency") {
            return trimmed[9..].trim_start();
        }
        trimmed
    }

    pub fn urgency_level(&self) -> UrgencyLevel {
        let urgency = self.urgency.to_lowercase();
        if urgency.contains("emergency") {
            UrgencyLevel::Emergency
        } else if urgency.contains("high") {
            UrgencyLevel::High
        } else {
            UrgencyLevel::Standard
        }
    }
}

/// One row of the itemized breakdown. Cells keep the text the reply used
/// (`"$200"`, `"2 hrs"`), since only the subtotal is ever summed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuote {
    pub quote_id: QuoteId,
    pub date: String,
    pub customer: CustomerInfo,
    pub service: ServiceInfo,
    pub currency: Currency,
    pub line_items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub terms: Vec<String>,
}

impl NormalizedQuote {
    /// Total with currency symbol and thousands separators, e.g. `$1,200.5`.
    pub fn formatted_total(&self) -> String {
        format!("{}{}", self.currency.symbol(), format_amount(self.total_amount))
    }
}

pub fn format_amount(amount: Decimal) -> String {
    let normalized = amount.normalize().to_string();
    let (sign, unsigned) = match normalized.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", normalized.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
