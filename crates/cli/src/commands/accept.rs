use std::path::Path;

use chrono::Utc;
use liftquote_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use liftquote_core::domain::quote::NOT_AVAILABLE;
use liftquote_core::submission::AcceptancePayload;
use liftquote_core::{classify_reply_with, ApplicationError, FormContext};

use crate::commands::webhook::{post_json, runtime};
use crate::commands::{parse_options, read_context, read_reply, CommandResult};

/// Accepts the quote in the reply and asks the job webhook to book the
/// technician. Any non-success status fails the command.
pub fn run(context: &Path, file: Option<&Path>, job_url: Option<String>) -> CommandResult {
    let overrides = ConfigOverrides { job_url, ..ConfigOverrides::default() };
    let config = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("accept", &ApplicationError::from(error)),
    };

    let inputs = read_context(Some(context))
        .and_then(|form| Ok((read_reply(file)?, form)));
    let (text, form) = match inputs {
        Ok(inputs) => inputs,
        Err(error) => return CommandResult::from_error("accept", &error),
    };
    let quote = classify_reply_with(&text, &form, &parse_options(&config));

    let Some(url) = config.webhook.job_url.clone() else {
        tracing::info!(
            event_name = "quote.accept.simulated",
            "no job webhook configured, simulating job creation"
        );
        return CommandResult::success("accept", format!("simulated {}", booking_summary(&form)));
    };

    let runtime = match runtime("accept") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let payload = AcceptancePayload::new(&form, &quote, Utc::now());
    let status = match runtime.block_on(post_json(&config.webhook, &url, &payload)) {
        Ok((status, _)) => status,
        Err(error) => return CommandResult::from_error("accept", &error),
    };

    if !status.is_success() {
        tracing::warn!(
            event_name = "quote.accept.rejected",
            status = status.as_u16(),
            "job webhook rejected the acceptance"
        );
        let error =
            ApplicationError::Integration(format!("job webhook returned {}", status.as_u16()));
        return CommandResult::from_error("accept", &error);
    }

    tracing::info!(event_name = "quote.accept.completed", status = status.as_u16(), "job created");
    CommandResult::success("accept", booking_summary(&form))
}

fn booking_summary(form: &FormContext) -> String {
    format!(
        "job created for {}; confirmation sent to {}",
        form.address().unwrap_or(NOT_AVAILABLE),
        form.contact_email().unwrap_or(NOT_AVAILABLE)
    )
}
