use chrono::Utc;
use liftquote_core::config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
use liftquote_core::submission::{ConnectionCheck, ConnectionTestPayload};
use liftquote_core::ApplicationError;

use crate::commands::webhook::{post_json, runtime};
use crate::commands::CommandResult;

pub fn run(webhook_url: Option<String>) -> CommandResult {
    let overrides = ConfigOverrides { webhook_url, ..ConfigOverrides::default() };
    let config = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("ping", &ApplicationError::from(error)),
    };
    let Some(url) = config.webhook.url.clone() else {
        let error = ConfigError::Validation("webhook.url is not configured".to_string());
        return CommandResult::from_error("ping", &ApplicationError::from(error));
    };

    let runtime = match runtime("ping") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let payload = ConnectionTestPayload::new(Utc::now());
    let status = match runtime.block_on(post_json(&config.webhook, &url, &payload)) {
        Ok((status, _)) => status.as_u16(),
        Err(error) => return CommandResult::from_error("ping", &error),
    };

    match ConnectionCheck::from_status(status) {
        ConnectionCheck::Ready => {
            CommandResult::success("ping", format!("webhook is working ({status})"))
        }
        ConnectionCheck::WorkflowInactive => CommandResult::failure(
            "ping",
            "workflow_inactive",
            "webhook returned 404; activate the automation workflow first",
            5,
        ),
        ConnectionCheck::UnexpectedStatus(status) => CommandResult::failure(
            "ping",
            "unexpected_status",
            format!("unexpected webhook status {status}"),
            5,
        ),
    }
}
