//! Plain-text exports of a parsed quote: a CSV summary for spreadsheets and
//! an iCalendar event for the service visit.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::domain::context::FormContext;
use crate::domain::quote::NormalizedQuote;

pub const CALENDAR_EVENT_TITLE: &str = "Elevator Service Appointment";
const VISIT_START_HOUR: u32 = 9;
const VISIT_DURATION_HOURS: i64 = 2;

pub fn quote_to_csv(quote: &NormalizedQuote) -> String {
    let mut lines = vec!["Service Quote Export".to_string(), String::new()];

    lines.push(csv_row(&["Quote ID", quote.quote_id.0.as_str()]));
    lines.push(csv_row(&["Date", quote.date.as_str()]));
    lines.push(csv_row(&["Customer", quote.customer.name.as_str()]));
    lines.push(csv_row(&["Email", quote.customer.email.as_str()]));
    lines.push(csv_row(&["Address", quote.customer.address.as_str()]));
    lines.push(String::new());

    lines.push("Service Details".to_string());
    lines.push(csv_row(&["Building Type", quote.service.building_type.as_str()]));
    lines.push(csv_row(&["Elevator Brand", quote.service.elevator_brand.as_str()]));
    lines.push(csv_row(&["Floors", quote.service.floors.as_str()]));
    lines.push(csv_row(&["Service Type", quote.service.display_service_type()]));
    lines.push(csv_row(&["Urgency", quote.service.urgency.as_str()]));
    lines.push(String::new());

    lines.push(csv_row(&["Description", "Qty", "Unit Price", "Subtotal"]));
    for item in &quote.line_items {
        lines.push(csv_row(&[
            item.description.as_str(),
            item.quantity.as_str(),
            item.unit_price.as_str(),
            item.subtotal.as_str(),
        ]));
    }
    let total = quote.formatted_total();
    lines.push(csv_row(&["Total", total.as_str()]));

    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

fn csv_row(cells: &[&str]) -> String {
    cells.iter().map(|cell| csv_cell(cell)).collect::<Vec<_>>().join(",")
}

fn csv_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Builds a two-hour visit starting 09:00 UTC on the requested visit date.
///
/// `today` is used when the form has no visit date or it is not `YYYY-MM-DD`.
pub fn visit_calendar_event(
    quote: &NormalizedQuote,
    context: &FormContext,
    today: NaiveDate,
) -> String {
    let visit_day = context
        .visit_date()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .unwrap_or(today);
    let start = visit_day.and_time(NaiveTime::MIN) + Duration::hours(i64::from(VISIT_START_HOUR));
    let end = start + Duration::hours(VISIT_DURATION_HOURS);

    let description = format!(
        "Service Type: {}\nBuilding: {}\nAddress: {}",
        quote.service.display_service_type(),
        quote.service.building_type,
        quote.customer.address
    );

    let mut ics = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//liftquote//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@liftquote", quote.quote_id.0),
        format!("DTSTART:{}", start.format("%Y%m%dT%H%M%SZ")),
        format!("DTEND:{}", end.format("%Y%m%dT%H%M%SZ")),
        format!("SUMMARY:{CALENDAR_EVENT_TITLE}"),
        format!("PRIORITY:{}", quote.service.urgency_level().calendar_priority()),
        format!("DESCRIPTION:{}", ics_text(&description)),
        format!("LOCATION:{}", ics_text(&quote.customer.address)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ]
    .join("\r\n");
    ics.push_str("\r\n");
    ics
}

fn ics_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{quote_to_csv, visit_calendar_event};
    use crate::domain::context::FormContext;
    use crate::domain::currency::Currency;
    use crate::domain::quote::{CustomerInfo, LineItem, NormalizedQuote, QuoteId, ServiceInfo};

    fn quote() -> NormalizedQuote {
        NormalizedQuote {
            quote_id: QuoteId("EQ-7".to_string()),
            date: "10/16/2026".to_string(),
            customer: CustomerInfo {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                address: "200 High St, Springfield".to_string(),
            },
            service: ServiceInfo {
                building_type: "Commercial".to_string(),
                elevator_brand: "Otis".to_string(),
                floors: "22".to_string(),
                service_type: "Emergency Brake Repair".to_string(),
                urgency: "Emergency".to_string(),
            },
            currency: Currency::Usd,
            line_items: vec![LineItem {
                description: "Brake assembly".to_string(),
                quantity: "1".to_string(),
                unit_price: "$1,450".to_string(),
                subtotal: "$1,450".to_string(),
            }],
            total_amount: Decimal::new(1450, 0),
            terms: Vec::new(),
        }
    }

    fn day(year: i32, month: u32, date: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, date).expect("valid date")
    }

    #[test]
    fn csv_quotes_cells_with_commas() {
        let csv = quote_to_csv(&quote());

        assert!(csv.starts_with("Service Quote Export\n\nQuote ID,EQ-7\n"));
        assert!(csv.contains("Address,\"200 High St, Springfield\"\n"));
        assert!(csv.contains("Service Type,Brake Repair\n"));
        assert!(csv.contains("Brake assembly,1,\"$1,450\",\"$1,450\"\n"));
        assert!(csv.ends_with("Total,\"$1,450\"\n"));
    }

    #[test]
    fn calendar_event_uses_visit_date() {
        let context =
            FormContext { visit_date: Some("2026-11-02".to_string()), ..FormContext::default() };
        let ics = visit_calendar_event(&quote(), &context, day(2026, 10, 16));

        assert!(ics.contains("DTSTART:20261102T090000Z\r\n"));
        assert!(ics.contains("DTEND:20261102T110000Z\r\n"));
        assert!(ics.contains("SUMMARY:Elevator Service Appointment\r\n"));
        assert!(ics.contains("PRIORITY:1\r\n"));
        assert!(ics.contains(
            "DESCRIPTION:Service Type: Brake Repair\\nBuilding: Commercial\\nAddress: 200 High St\\, Springfield\r\n"
        ));
        assert!(ics.contains("LOCATION:200 High St\\, Springfield\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn calendar_event_falls_back_to_today() {
        let context =
            FormContext { visit_date: Some("next tuesday".to_string()), ..FormContext::default() };
        let ics = visit_calendar_event(&quote(), &context, day(2026, 10, 16));

        assert!(ics.contains("DTSTART:20261016T090000Z\r\n"));
    }

    #[test]
    fn calendar_priority_follows_urgency() {
        let mut routine = quote();
        routine.service.urgency = "Normal".to_string();
        let ics = visit_calendar_event(&routine, &FormContext::default(), day(2026, 10, 16));
        assert!(ics.contains("PRIORITY:5\r\n"));

        routine.service.urgency = "High".to_string();
        let ics = visit_calendar_event(&routine, &FormContext::default(), day(2026, 10, 16));
        assert!(ics.contains("PRIORITY:3\r\n"));
    }
}
