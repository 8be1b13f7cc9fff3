pub mod accept;
pub mod config;
pub mod export;
pub mod negotiate;
pub mod parse;
pub mod ping;
pub mod submit;
mod webhook;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use liftquote_core::config::{AppConfig, LoadOptions};
use liftquote_core::{ApplicationError, FormContext, ParseOptions};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    /// Success outcome carrying a structured document under `data`.
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: &impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => return Self::from_error(command, &ApplicationError::from(error)),
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    /// Raw command output, such as an export body.
    pub fn raw(output: String) -> Self {
        Self { exit_code: 0, output }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config() -> Result<AppConfig, ApplicationError> {
    Ok(AppConfig::load(LoadOptions::default())?)
}

pub(crate) fn parse_options(config: &AppConfig) -> ParseOptions {
    ParseOptions { id_prefix: config.quote.id_prefix.clone(), ..ParseOptions::default() }
}

/// Reads the reply text from `path`, or stdin when no path (or `-`) is given.
pub(crate) fn read_reply(path: Option<&Path>) -> Result<String, ApplicationError> {
    match path {
        Some(path) if path != Path::new("-") => read_file(path),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| ApplicationError::Io { path: "<stdin>".to_string(), source })?;
            Ok(text)
        }
    }
}

/// Loads a form context JSON document. No path means an empty form.
pub(crate) fn read_context(path: Option<&Path>) -> Result<FormContext, ApplicationError> {
    let Some(path) = path else {
        return Ok(FormContext::default());
    };
    let raw = read_file(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn read_file(path: &Path) -> Result<String, ApplicationError> {
    fs::read_to_string(path)
        .map_err(|source| ApplicationError::Io { path: path.display().to_string(), source })
}
