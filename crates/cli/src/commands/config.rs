use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use liftquote_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILE, NESTED_CONFIG_FILE};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "webhook.url",
        config.webhook.url.as_deref().unwrap_or("<unset> (replies are simulated)"),
        source("webhook.url", &["LIFTQUOTE_WEBHOOK_URL"]),
    ));
    lines.push(render_line(
        "webhook.job_url",
        config.webhook.job_url.as_deref().unwrap_or("<unset> (acceptance is simulated)"),
        source("webhook.job_url", &["LIFTQUOTE_WEBHOOK_JOB_URL"]),
    ));
    lines.push(render_line(
        "webhook.negotiation_url",
        config.webhook.negotiation_url.as_deref().unwrap_or("<unset>"),
        source("webhook.negotiation_url", &["LIFTQUOTE_WEBHOOK_NEGOTIATION_URL"]),
    ));
    let auth_token = config
        .webhook
        .auth_token
        .as_ref()
        .map(|token| redact_token(token.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    lines.push(render_line(
        "webhook.auth_token",
        &auth_token,
        source("webhook.auth_token", &["LIFTQUOTE_WEBHOOK_AUTH_TOKEN"]),
    ));
    lines.push(render_line(
        "webhook.timeout_secs",
        &config.webhook.timeout_secs.to_string(),
        source("webhook.timeout_secs", &["LIFTQUOTE_WEBHOOK_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "quote.id_prefix",
        &config.quote.id_prefix,
        source("quote.id_prefix", &["LIFTQUOTE_QUOTE_ID_PREFIX"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["LIFTQUOTE_LOGGING_LEVEL", "LIFTQUOTE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["LIFTQUOTE_LOGGING_FORMAT", "LIFTQUOTE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps at most the first four characters of a token.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.char_indices().nth(4) {
        Some((cut, _)) if trimmed.chars().count() > 8 => format!("{}***", &trimmed[..cut]),
        _ => "<redacted>".to_string(),
    }
}
