//! Scalar field extraction from free-form quote replies.
//!
//! Every field runs through the same chain: ordered patterns against the
//! reply text, then the caller's form context, then a computed default, then
//! `N/A`. Extraction therefore never fails.

pub mod currency;
pub mod html;
pub mod patterns;

use std::sync::LazyLock;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::context::FormContext;
use crate::domain::currency::Currency;
use crate::domain::quote::{CustomerInfo, QuoteId, ServiceInfo, NOT_AVAILABLE};

use self::patterns::{brand_phrase_pattern, FieldRule};

pub const DEFAULT_ID_PREFIX: &str = "Q-";
pub const DEFAULT_SERVICE_TYPE: &str = "Service";
pub const DEFAULT_URGENCY: &str = "Normal";
pub const EMERGENCY_URGENCY: &str = "Emergency";

static QUOTE_ID: LazyLock<FieldRule> = LazyLock::new(|| {
    FieldRule::new().pattern(r"(?i)###\s*Quote ID:\s*(\S+)").labeled("Quote ID")
});
static DATE: LazyLock<FieldRule> = LazyLock::new(|| FieldRule::new().labeled("Date"));
static NAME: LazyLock<FieldRule> = LazyLock::new(|| FieldRule::new().labeled("Name"));
static EMAIL: LazyLock<FieldRule> = LazyLock::new(|| FieldRule::new().labeled("Email"));
static ADDRESS: LazyLock<FieldRule> = LazyLock::new(|| FieldRule::new().labeled("Address"));
static BUILDING_TYPE: LazyLock<FieldRule> =
    LazyLock::new(|| FieldRule::new().labeled("Building Type"));
static ELEVATOR_BRAND: LazyLock<FieldRule> = LazyLock::new(|| {
    FieldRule::new().labeled("Elevator Brand").pattern(&brand_phrase_pattern())
});
static FLOORS: LazyLock<FieldRule> = LazyLock::new(|| FieldRule::new().labeled("Floors"));
static SERVICE_TYPE: LazyLock<FieldRule> = LazyLock::new(|| {
    FieldRule::new().labeled("Service Type").pattern(r"(?i)Itemized Quote for\s+([^\n]+)")
});
static URGENCY: LazyLock<FieldRule> = LazyLock::new(|| FieldRule::new().labeled("Urgency"));

/// Inputs for the computed defaults: the generated quote id and issue date.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    pub id_prefix: String,
    pub issued_at: DateTime<Local>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { id_prefix: DEFAULT_ID_PREFIX.to_string(), issued_at: Local::now() }
    }
}

impl ParseOptions {
    /// Prefix plus the last six digits of the issue timestamp in milliseconds.
    /// Unique enough to tell quotes apart within a session, nothing more.
    pub fn generated_quote_id(&self) -> QuoteId {
        let millis = self.issued_at.timestamp_millis().rem_euclid(1_000_000);
        QuoteId(format!("{}{millis:06}", self.id_prefix))
    }

    pub fn issue_date(&self) -> String {
        self.issued_at.format("%-m/%-d/%Y").to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarFields {
    pub quote_id: QuoteId,
    pub date: String,
    pub customer: CustomerInfo,
    pub service: ServiceInfo,
    pub currency: Currency,
}

pub fn extract_fields(text: &str, context: &FormContext) -> ScalarFields {
    extract_fields_with(text, context, &ParseOptions::default())
}

pub fn extract_fields_with(
    text: &str,
    context: &FormContext,
    options: &ParseOptions,
) -> ScalarFields {
    extract_unwrapped(html::unwrap_fallback(text).as_ref(), context, options)
}

/// Extraction over text whose HTML fallback wrapper was already removed.
pub(crate) fn extract_unwrapped(
    text: &str,
    context: &FormContext,
    options: &ParseOptions,
) -> ScalarFields {
    let quote_id = QUOTE_ID.find(text).map(QuoteId).unwrap_or_else(|| {
        tracing::debug!(
            event_name = "quote.extract.quote_id_generated",
            "reply carried no quote id, generating one"
        );
        options.generated_quote_id()
    });
    let date = DATE.find(text).unwrap_or_else(|| options.issue_date());

    let customer = CustomerInfo {
        name: resolve(&NAME, text, context.contact_name()),
        email: resolve(&EMAIL, text, context.contact_email()),
        address: resolve(&ADDRESS, text, context.address()),
    };

    let service_type = SERVICE_TYPE
        .find(text)
        .or_else(|| context.service_type().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_SERVICE_TYPE.to_string());

    let service = ServiceInfo {
        building_type: resolve(&BUILDING_TYPE, text, context.building_type()),
        elevator_brand: resolve(&ELEVATOR_BRAND, text, context.elevator_brand()),
        floors: resolve(&FLOORS, text, context.floors()),
        service_type,
        urgency: resolve_urgency(text, context),
    };

    ScalarFields {
        quote_id,
        date,
        customer,
        service,
        currency: currency::detect_currency(text),
    }
}

fn resolve(rule: &FieldRule, text: &str, context_value: Option<&str>) -> String {
    rule.find(text)
        .or_else(|| context_value.map(str::to_string))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// An explicit urgency field wins; otherwise any mention of "emergency" in the
/// reply outranks what the form said.
fn resolve_urgency(text: &str, context: &FormContext) -> String {
    if let Some(urgency) = URGENCY.find(text) {
        return urgency;
    }
    if text.to_lowercase().contains("emergency") {
        return EMERGENCY_URGENCY.to_string();
    }
    context.urgency().unwrap_or(DEFAULT_URGENCY).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::{extract_fields, extract_fields_with, ParseOptions};
    use crate::domain::context::FormContext;
    use crate::domain::currency::Currency;
    use crate::domain::quote::QuoteId;

    fn options() -> ParseOptions {
        let issued_at = Local
            .with_ymd_and_hms(2026, 3, 5, 12, 0, 0)
            .single()
            .expect("fixed local time should be unambiguous");
        ParseOptions { id_prefix: "Q-".to_string(), issued_at }
    }

    #[test]
    fn bold_labels_are_extracted() {
        let fields = extract_fields(
            "**Name:** Alice\n**Email:** alice@example.com\n**Address:** 1 Lift Way",
            &FormContext::default(),
        );

        assert_eq!(fields.customer.name, "Alice");
        assert_eq!(fields.customer.email, "alice@example.com");
        assert_eq!(fields.customer.address, "1 Lift Way");
    }

    #[test]
    fn missing_name_falls_back_to_context_then_placeholder() {
        let context =
            FormContext { contact_name: Some("Bob".to_string()), ..FormContext::default() };

        assert_eq!(extract_fields("no labels here", &context).customer.name, "Bob");
        assert_eq!(extract_fields("no labels here", &FormContext::default()).customer.name, "N/A");
    }

    #[test]
    fn reply_value_beats_context_value() {
        let context =
            FormContext { building_type: Some("Residential".to_string()), ..FormContext::default() };
        let fields = extract_fields("Building Type: Hospital", &context);

        assert_eq!(fields.service.building_type, "Hospital");
    }

    #[test]
    fn heading_quote_id_takes_first_token() {
        let fields = extract_fields("### Quote ID: EQ-2291 (draft)\n", &FormContext::default());
        assert_eq!(fields.quote_id, QuoteId("EQ-2291".to_string()));
    }

    #[test]
    fn generated_defaults_come_from_options() {
        let options = options();
        let fields = extract_fields_with("", &FormContext::default(), &options);

        let expected_suffix = options.issued_at.timestamp_millis().rem_euclid(1_000_000);
        assert_eq!(fields.quote_id, QuoteId(format!("Q-{expected_suffix:06}")));
        assert_eq!(fields.date, "3/5/2026");
        assert_eq!(fields.service.service_type, "Service");
        assert_eq!(fields.service.urgency, "Normal");
        assert_eq!(fields.service.floors, "N/A");
        assert_eq!(fields.currency, Currency::Usd);
    }

    #[test]
    fn brand_phrase_and_itemized_heading_are_recognised() {
        let fields = extract_fields(
            "## Itemized Quote for Emergency Cable Replacement\nWork for Schindler Elevator units.",
            &FormContext::default(),
        );

        assert_eq!(fields.service.elevator_brand, "Schindler");
        assert_eq!(fields.service.service_type, "Emergency Cable Replacement");
        assert_eq!(fields.service.display_service_type(), "Cable Replacement");
    }

    #[test]
    fn emergency_mention_sets_urgency_over_context() {
        let context = FormContext { urgency: Some("Low".to_string()), ..FormContext::default() };
        let fields = extract_fields("This is an EMERGENCY call-out.", &context);

        assert_eq!(fields.service.urgency, "Emergency");
    }

    #[test]
    fn explicit_urgency_field_beats_emergency_mention() {
        let fields = extract_fields(
            "**Urgency:** High\nEmergency hotline available 24/7",
            &FormContext::default(),
        );
        assert_eq!(fields.service.urgency, "High");
    }

    #[test]
    fn context_urgency_used_without_any_mention() {
        let context = FormContext { urgency: Some("Low".to_string()), ..FormContext::default() };
        assert_eq!(extract_fields("routine visit", &context).service.urgency, "Low");
    }

    #[test]
    fn html_wrapped_reply_is_unwrapped_first() {
        let fields = extract_fields(
            r#"<div class="quote-text-fallback">**Name:** Carol<br>**Floors:** 14</div>"#,
            &FormContext::default(),
        );

        assert_eq!(fields.customer.name, "Carol");
        assert_eq!(fields.service.floors, "14");
    }

    #[test]
    fn generic_error_text_degrades_to_context() {
        let context = FormContext {
            contact_name: Some("Dana".to_string()),
            elevator_brand: Some("Kone".to_string()),
            ..FormContext::default()
        };
        let fields = extract_fields("Error: Server returned 502 Bad Gateway", &context);

        assert_eq!(fields.customer.name, "Dana");
        assert_eq!(fields.service.elevator_brand, "Kone");
        assert_eq!(fields.customer.email, "N/A");
    }
}
