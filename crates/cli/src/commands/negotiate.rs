use std::path::Path;

use chrono::Utc;
use liftquote_core::config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
use liftquote_core::reply::unwrap_envelope;
use liftquote_core::submission::{NegotiationPayload, NEGOTIATION_UNAVAILABLE_REPLY};
use liftquote_core::{classify_reply_with, ApplicationError, QuoteReply};
use serde::Serialize;

use crate::commands::webhook::{post_json, runtime};
use crate::commands::{parse_options, read_context, read_reply, CommandResult};

#[derive(Debug, Serialize)]
pub struct NegotiationReport {
    pub http_status: u16,
    pub reply: String,
}

/// Sends one customer message about the quote in the reply to the
/// negotiation webhook and prints the agent's answer.
pub fn run(
    message: &str,
    file: Option<&Path>,
    context: Option<&Path>,
    negotiation_url: Option<String>,
) -> CommandResult {
    let message = message.trim();
    if message.is_empty() {
        return CommandResult::failure("negotiate", "invalid_input", "message must not be empty", 3);
    }

    let overrides = ConfigOverrides { negotiation_url, ..ConfigOverrides::default() };
    let config = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::from_error("negotiate", &ApplicationError::from(error))
        }
    };
    let Some(url) = config.webhook.negotiation_url.clone() else {
        let error =
            ConfigError::Validation("webhook.negotiation_url is not configured".to_string());
        return CommandResult::from_error("negotiate", &ApplicationError::from(error));
    };

    let quote = match quote_under_discussion(&config, file, context) {
        Ok(quote) => quote,
        Err(error) => return CommandResult::from_error("negotiate", &error),
    };

    let runtime = match runtime("negotiate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let payload = NegotiationPayload { message, quote_data: &quote, timestamp: Utc::now() };
    let (status, body) = match runtime.block_on(post_json(&config.webhook, &url, &payload)) {
        Ok(response) => response,
        Err(error) => return CommandResult::from_error("negotiate", &error),
    };

    let (summary, reply) = if status.is_success() {
        ("negotiation reply received", unwrap_envelope(&body))
    } else {
        tracing::warn!(
            event_name = "quote.negotiate.server_error",
            status = status.as_u16(),
            "negotiation webhook returned a non-success status"
        );
        ("negotiation service unavailable", NEGOTIATION_UNAVAILABLE_REPLY.to_string())
    };

    let report = NegotiationReport { http_status: status.as_u16(), reply };
    CommandResult::success_with_data("negotiate", summary, &report)
}

fn quote_under_discussion(
    config: &AppConfig,
    file: Option<&Path>,
    context: Option<&Path>,
) -> Result<QuoteReply, ApplicationError> {
    let form = read_context(context)?;
    let text = read_reply(file)?;
    Ok(classify_reply_with(&text, &form, &parse_options(config)))
}
