use std::path::Path;

use chrono::Utc;
use liftquote_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use liftquote_core::submission::{server_error_reply, SubmissionPayload, SIMULATION_REPLY};
use liftquote_core::{classify_reply_with, ApplicationError, FormContext, QuoteReply};
use serde::Serialize;

use crate::commands::webhook::{post_json, runtime};
use crate::commands::{parse_options, read_context, CommandResult};

#[derive(Debug, Serialize)]
pub struct SubmitReport {
    pub simulated: bool,
    pub http_status: Option<u16>,
    pub reply: QuoteReply,
}

pub fn run(context: &Path, webhook_url: Option<String>) -> CommandResult {
    let overrides = ConfigOverrides { webhook_url, ..ConfigOverrides::default() };
    let config = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("submit", &ApplicationError::from(error)),
    };

    let form = match read_context(Some(context)).and_then(|form| {
        form.validate_required()?;
        Ok(form)
    }) {
        Ok(form) => form,
        Err(error) => return CommandResult::from_error("submit", &error),
    };

    let Some(url) = config.webhook.url.clone() else {
        tracing::info!(
            event_name = "quote.submit.simulated",
            "no webhook configured, using simulation reply"
        );
        return report(&config, &form, SIMULATION_REPLY, None);
    };

    let runtime = match runtime("submit") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let payload = SubmissionPayload::new(&form, Utc::now());
    let (status, body) = match runtime.block_on(post_json(&config.webhook, &url, &payload)) {
        Ok(response) => response,
        Err(error) => return CommandResult::from_error("submit", &error),
    };

    if !status.is_success() {
        tracing::warn!(
            event_name = "quote.submit.server_error",
            status = status.as_u16(),
            "webhook returned a non-success status"
        );
        let reason = status.canonical_reason().unwrap_or_default();
        let text = server_error_reply(status.as_u16(), reason);
        return report(&config, &form, &text, Some(status.as_u16()));
    }

    tracing::info!(
        event_name = "quote.submit.completed",
        status = status.as_u16(),
        reply_bytes = body.len(),
        "webhook reply received"
    );
    report(&config, &form, &body, Some(status.as_u16()))
}

fn report(
    config: &AppConfig,
    form: &FormContext,
    text: &str,
    http_status: Option<u16>,
) -> CommandResult {
    let reply = classify_reply_with(text, form, &parse_options(config));
    let message = match (&reply, http_status) {
        (_, None) => "simulated submission".to_string(),
        (_, Some(status)) if !(200..300).contains(&status) => {
            format!("webhook returned {status}; quote built from the form")
        }
        (QuoteReply::Estimate(estimate), Some(_)) => {
            format!("estimate {}", estimate.formatted_quote())
        }
        (QuoteReply::Itemized(quote), Some(_)) => {
            format!("quote {} total {}", quote.quote_id.0, quote.formatted_total())
        }
    };
    let report = SubmitReport { simulated: http_status.is_none(), http_status, reply };
    CommandResult::success_with_data("submit", message, &report)
}
