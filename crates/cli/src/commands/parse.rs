use std::path::Path;

use liftquote_core::{classify_reply_with, ApplicationError, QuoteReply};

use crate::commands::{load_config, parse_options, read_context, read_reply, CommandResult};

pub fn run(file: Option<&Path>, context: Option<&Path>) -> CommandResult {
    match parse(file, context) {
        Ok(reply) => {
            let message = match &reply {
                QuoteReply::Estimate(estimate) => {
                    format!("estimate {}", estimate.formatted_quote())
                }
                QuoteReply::Itemized(quote) => {
                    format!("quote {} total {}", quote.quote_id.0, quote.formatted_total())
                }
            };
            CommandResult::success_with_data("parse", message, &reply)
        }
        Err(error) => CommandResult::from_error("parse", &error),
    }
}

fn parse(file: Option<&Path>, context: Option<&Path>) -> Result<QuoteReply, ApplicationError> {
    let config = load_config()?;
    let context = read_context(context)?;
    let text = read_reply(file)?;

    Ok(classify_reply_with(&text, &context, &parse_options(&config)))
}
