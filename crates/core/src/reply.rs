//! Classification of webhook replies.
//!
//! The automation either answers with a structured JSON estimate or with
//! markdown-ish text (sometimes wrapped in a JSON envelope). Estimates are
//! shown as-is; everything else goes through the text parser.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::context::FormContext;
use crate::domain::quote::{format_amount, NormalizedQuote};
use crate::extract::ParseOptions;
use crate::pipeline::parse_quote_with;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub labour: Option<Decimal>,
    pub parts: Option<Decimal>,
    pub travel: Option<Decimal>,
}

/// A priced estimate returned directly as JSON, e.g.
/// `{"quote": 1800, "breakdown": {"labour": 900}, "negotiation_range": [1600, 1900]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub quote: Decimal,
    pub breakdown: Breakdown,
    pub negotiation_range: Option<(Decimal, Decimal)>,
}

impl Estimate {
    pub fn formatted_quote(&self) -> String {
        format!("${}", format_amount(self.quote))
    }

    /// `($1,600 - $1,900)` when the automation offered room to negotiate.
    pub fn formatted_range(&self) -> Option<String> {
        self.negotiation_range
            .map(|(low, high)| format!("(${} - ${})", format_amount(low), format_amount(high)))
    }

    fn from_object(object: &Map<String, Value>) -> Option<Self> {
        let quote = object.get("quote").and_then(json_amount).filter(|quote| !quote.is_zero())?;

        let breakdown = object
            .get("breakdown")
            .and_then(Value::as_object)
            .map(|breakdown| Breakdown {
                labour: breakdown.get("labour").and_then(json_amount),
                parts: breakdown.get("parts").and_then(json_amount),
                travel: breakdown.get("travel").and_then(json_amount),
            })
            .unwrap_or_default();

        let negotiation_range = object
            .get("negotiation_range")
            .and_then(Value::as_array)
            .and_then(|range| Some((json_amount(range.first()?)?, json_amount(range.get(1)?)?)));

        Some(Self { quote, breakdown, negotiation_range })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteReply {
    Estimate(Estimate),
    Itemized(NormalizedQuote),
}

pub fn classify_reply(text: &str, context: &FormContext) -> QuoteReply {
    classify_reply_with(text, context, &ParseOptions::default())
}

pub fn classify_reply_with(
    text: &str,
    context: &FormContext,
    options: &ParseOptions,
) -> QuoteReply {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        return QuoteReply::Itemized(parse_quote_with(text, context, options));
    }

    let object = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(object)) => object,
        Ok(_) => return QuoteReply::Itemized(parse_quote_with(text, context, options)),
        Err(error) => {
            tracing::debug!(
                event_name = "quote.reply.json_rejected",
                error = %error,
                "reply looked like JSON but did not parse, treating it as text"
            );
            return QuoteReply::Itemized(parse_quote_with(text, context, options));
        }
    };

    if let Some(estimate) = Estimate::from_object(&object) {
        return QuoteReply::Estimate(estimate);
    }

    match envelope_text(&object) {
        Some(inner) => QuoteReply::Itemized(parse_quote_with(inner, context, options)),
        None => QuoteReply::Itemized(parse_quote_with(text, context, options)),
    }
}

/// Returns the text inside a `{"text"|"output": ...}` envelope, or the body
/// itself when it is not one.
pub fn unwrap_envelope(body: &str) -> String {
    match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Object(object)) => envelope_text(&object).unwrap_or(body).to_string(),
        _ => body.to_string(),
    }
}

/// Automation tools often wrap generated text as `{"output": "..."}` or
/// `{"text": "..."}`; `text` wins when both are present.
fn envelope_text(object: &Map<String, Value>) -> Option<&str> {
    let non_empty = |key: &str| object.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
    non_empty("text").or_else(|| non_empty("output"))
}

fn json_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => Decimal::from_str(&number.to_string())
            .ok()
            .or_else(|| number.as_f64().and_then(Decimal::from_f64)),
        Value::String(raw) => Decimal::from_str(raw.trim()).ok(),
        _ => None,
    }
}
