use std::time::Duration;

use liftquote_core::config::WebhookConfig;
use liftquote_core::ApplicationError;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::commands::CommandResult;

pub(crate) fn runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            7,
        )
    })
}

/// POSTs `payload` as JSON with the configured bearer token and timeout, and
/// returns the status with the full body text.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    webhook: &WebhookConfig,
    url: &str,
    payload: &T,
) -> Result<(StatusCode, String), ApplicationError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(webhook.timeout_secs))
        .build()
        .map_err(|error| ApplicationError::Integration(error.to_string()))?;

    let mut request = client.post(url).json(payload);
    if let Some(token) = &webhook.auth_token {
        request = request.bearer_auth(token.expose_secret());
    }

    let response = request.send().await.map_err(|error| {
        tracing::warn!(
            event_name = "quote.webhook.request_failed",
            error = %error,
            "webhook request failed"
        );
        ApplicationError::Integration(error.to_string())
    })?;

    let status = response.status();
    let body =
        response.text().await.map_err(|error| ApplicationError::Integration(error.to_string()))?;
    tracing::debug!(
        event_name = "quote.webhook.responded",
        status = status.as_u16(),
        body_bytes = body.len(),
        "webhook responded"
    );
    Ok((status, body))
}
