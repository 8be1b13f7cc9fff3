use crate::domain::context::FormContext;
use crate::domain::quote::{LineItem, NormalizedQuote};
use crate::extract::{extract_unwrapped, html, ParseOptions};
use crate::normalize::{extract_line_items, extract_terms};

/// Turns a webhook reply into a fully populated quote.
///
/// Never fails: the worst input (empty text, an error string) still yields
/// a quote built from the form context and defaults.
pub fn parse_quote(text: &str, context: &FormContext) -> NormalizedQuote {
    parse_quote_with(text, context, &ParseOptions::default())
}

pub fn parse_quote_with(
    text: &str,
    context: &FormContext,
    options: &ParseOptions,
) -> NormalizedQuote {
    let unwrapped = html::unwrap_fallback(text);
    let text = unwrapped.as_ref();

    let fields = extract_unwrapped(text, context, options);
    let table = extract_line_items(text);

    let mut line_items = table.items;
    if line_items.is_empty() {
        tracing::debug!(
            event_name = "quote.table.synthetic_line_item",
            quote_id = %fields.quote_id.0,
            "reply carried no usable table rows, showing a single summary row"
        );
        let amount = format!("{}{}", fields.currency.symbol(), table.total);
        line_items.push(LineItem {
            description: format!(
                "{} - {} Elevator",
                fields.service.service_type, fields.service.elevator_brand
            ),
            quantity: "1".to_string(),
            unit_price: amount.clone(),
            subtotal: amount,
        });
    }

    let quote = NormalizedQuote {
        quote_id: fields.quote_id,
        date: fields.date,
        customer: fields.customer,
        service: fields.service,
        currency: fields.currency,
        line_items,
        total_amount: table.total,
        terms: extract_terms(text),
    };

    tracing::debug!(
        event_name = "quote.parse.completed",
        quote_id = %quote.quote_id.0,
        line_items = quote.line_items.len(),
        total = %quote.total_amount,
        currency = quote.currency.code(),
        "quote reply normalized"
    );

    quote
}
