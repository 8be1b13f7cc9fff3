use std::path::Path;

use chrono::Utc;
use clap::ValueEnum;
use liftquote_core::export::{quote_to_csv, visit_calendar_event};
use liftquote_core::{classify_reply_with, ApplicationError, QuoteReply};

use crate::commands::{load_config, parse_options, read_context, read_reply, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Ics,
}

pub fn run(format: ExportFormat, file: Option<&Path>, context: &Path) -> CommandResult {
    match export(format, file, context) {
        Ok(Some(body)) => CommandResult::raw(body),
        Ok(None) => CommandResult::failure(
            "export",
            "unsupported_reply",
            "reply is a priced estimate without line items; only itemized quotes can be exported",
            3,
        ),
        Err(error) => CommandResult::from_error("export", &error),
    }
}

fn export(
    format: ExportFormat,
    file: Option<&Path>,
    context: &Path,
) -> Result<Option<String>, ApplicationError> {
    let config = load_config()?;
    let context = read_context(Some(context))?;
    let text = read_reply(file)?;

    let QuoteReply::Itemized(quote) = classify_reply_with(&text, &context, &parse_options(&config))
    else {
        return Ok(None);
    };

    tracing::debug!(
        event_name = "quote.export.rendered",
        quote_id = %quote.quote_id.0,
        format = ?format,
        "rendering quote export"
    );

    Ok(Some(match format {
        ExportFormat::Csv => quote_to_csv(&quote),
        ExportFormat::Ics => visit_calendar_event(&quote, &context, Utc::now().date_naive()),
    }))
}
