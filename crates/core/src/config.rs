use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::DEFAULT_ID_PREFIX;

pub const DEFAULT_CONFIG_FILE: &str = "liftquote.toml";
pub const NESTED_CONFIG_FILE: &str = "config/liftquote.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub webhook: WebhookConfig,
    pub quote: QuoteConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// Quote automation endpoint. Unset means replies are simulated.
    pub url: Option<String>,
    /// Job creation endpoint for accepted quotes. Unset means acceptance is
    /// simulated.
    pub job_url: Option<String>,
    pub negotiation_url: Option<String>,
    pub auth_token: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct QuoteConfig {
    pub id_prefix: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub webhook_url: Option<String>,
    pub job_url: Option<String>,
    pub negotiation_url: Option<String>,
    pub webhook_timeout_secs: Option<u64>,
    pub quote_id_prefix: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            webhook: WebhookConfig {
                url: None,
                job_url: None,
                negotiation_url: None,
                auth_token: None,
                timeout_secs: 60,
            },
            quote: QuoteConfig { id_prefix: DEFAULT_ID_PREFIX.to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(webhook) = patch.webhook {
            if let Some(url) = webhook.url {
                self.webhook.url = Some(url);
            }
            if let Some(job_url) = webhook.job_url {
                self.webhook.job_url = Some(job_url);
            }
            if let Some(negotiation_url) = webhook.negotiation_url {
                self.webhook.negotiation_url = Some(negotiation_url);
            }
            if let Some(webhook_auth_token_value) = webhook.auth_token {
                self.webhook.auth_token = Some(secret_value(webhook_auth_token_value));
            }
            if let Some(timeout_secs) = webhook.timeout_secs {
                self.webhook.timeout_secs = timeout_secs;
            }
        }

        if let Some(quote) = patch.quote {
            if let Some(id_prefix) = quote.id_prefix {
                self.quote.id_prefix = id_prefix;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LIFTQUOTE_WEBHOOK_URL") {
            self.webhook.url = Some(value);
        }
        if let Some(value) = read_env("LIFTQUOTE_WEBHOOK_JOB_URL") {
            self.webhook.job_url = Some(value);
        }
        if let Some(value) = read_env("LIFTQUOTE_WEBHOOK_NEGOTIATION_URL") {
            self.webhook.negotiation_url = Some(value);
        }
        if let Some(value) = read_env("LIFTQUOTE_WEBHOOK_AUTH_TOKEN") {
            self.webhook.auth_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("LIFTQUOTE_WEBHOOK_TIMEOUT_SECS") {
            self.webhook.timeout_secs = parse_u64("LIFTQUOTE_WEBHOOK_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("LIFTQUOTE_QUOTE_ID_PREFIX") {
            self.quote.id_prefix = value;
        }

        let log_level =
            read_env("LIFTQUOTE_LOGGING_LEVEL").or_else(|| read_env("LIFTQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LIFTQUOTE_LOGGING_FORMAT").or_else(|| read_env("LIFTQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(webhook_url) = overrides.webhook_url {
            self.webhook.url = Some(webhook_url);
        }
        if let Some(job_url) = overrides.job_url {
            self.webhook.job_url = Some(job_url);
        }
        if let Some(negotiation_url) = overrides.negotiation_url {
            self.webhook.negotiation_url = Some(negotiation_url);
        }
        if let Some(timeout_secs) = overrides.webhook_timeout_secs {
            self.webhook.timeout_secs = timeout_secs;
        }
        if let Some(id_prefix) = overrides.quote_id_prefix {
            self.quote.id_prefix = id_prefix;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_webhook(&self.webhook)?;
        validate_quote(&self.quote)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_webhook(webhook: &WebhookConfig) -> Result<(), ConfigError> {
    let endpoints = [
        ("webhook.url", &webhook.url),
        ("webhook.job_url", &webhook.job_url),
        ("webhook.negotiation_url", &webhook.negotiation_url),
    ];
    for (key, url) in endpoints {
        let Some(url) = url.as_deref().map(str::trim) else {
            continue;
        };
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{key} must start with http:// or https://"
            )));
        }
    }

    if webhook.auth_token.as_ref().is_some_and(|token| token.expose_secret().trim().is_empty()) {
        return Err(ConfigError::Validation(
            "webhook.auth_token must not be blank when set".to_string(),
        ));
    }

    if webhook.timeout_secs == 0 || webhook.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "webhook.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_quote(quote: &QuoteConfig) -> Result<(), ConfigError> {
    if quote.id_prefix.trim().is_empty() {
        return Err(ConfigError::Validation("quote.id_prefix must not be empty".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    webhook: Option<WebhookPatch>,
    quote: Option<QuotePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPatch {
    url: Option<String>,
    job_url: Option<String>,
    negotiation_url: Option<String>,
    auth_token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct QuotePatch {
    id_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_load_without_file_or_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.webhook.url.is_none(), "webhook url should default to unset")?;
        ensure(config.webhook.timeout_secs == 60, "webhook timeout should default to 60s")?;
        ensure(config.quote.id_prefix == "Q-", "quote id prefix should default to Q-")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_LIFTQUOTE_HOOK_TOKEN", "hook-token-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("liftquote.toml");
            fs::write(
                &path,
                r#"
[webhook]
url = "https://automation.example.com/webhook/quote"
auth_token = "${TEST_LIFTQUOTE_HOOK_TOKEN}"

[quote]
id_prefix = "ELV-"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.webhook.auth_token.as_ref().map(|token| token.expose_secret())
                    == Some("hook-token-from-env"),
                "auth token should be interpolated from environment",
            )?;
            ensure(config.quote.id_prefix == "ELV-", "id prefix should come from file")?;
            Ok(())
        })();

        clear_vars(&["TEST_LIFTQUOTE_HOOK_TOKEN"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("liftquote.toml");
        fs::write(&path, "[webhook]\nurl = \"${LIFTQUOTE_TEST_UNSET_VAR}\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };

        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "LIFTQUOTE_TEST_UNSET_VAR"),
            "missing variable should be named in the error",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LIFTQUOTE_LOG_LEVEL", "warn");
        env::set_var("LIFTQUOTE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["LIFTQUOTE_LOG_LEVEL", "LIFTQUOTE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LIFTQUOTE_WEBHOOK_URL", "https://from-env.example.com/hook");
        env::set_var("LIFTQUOTE_WEBHOOK_TIMEOUT_SECS", "45");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("liftquote.toml");
            fs::write(
                &path,
                r#"
[webhook]
url = "https://from-file.example.com/hook"
timeout_secs = 20

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    webhook_url: Some("https://from-override.example.com/hook".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.webhook.url.as_deref() == Some("https://from-override.example.com/hook"),
                "override webhook url should win",
            )?;
            ensure(config.webhook.timeout_secs == 45, "env timeout should win over file")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            Ok(())
        })();

        clear_vars(&["LIFTQUOTE_WEBHOOK_URL", "LIFTQUOTE_WEBHOOK_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LIFTQUOTE_WEBHOOK_URL", "ftp://automation.example.com");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("webhook.url")
            );
            ensure(has_message, "validation failure should mention webhook.url")
        })();

        clear_vars(&["LIFTQUOTE_WEBHOOK_URL"]);
        result
    }

    #[test]
    fn job_and_negotiation_urls_layer_and_validate() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LIFTQUOTE_WEBHOOK_NEGOTIATION_URL", "https://hooks.example.com/negotiate");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("liftquote.toml");
            fs::write(&path, "[webhook]\njob_url = \"https://hooks.example.com/job\"\n")
                .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path.clone()),
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;
            ensure(
                config.webhook.job_url.as_deref() == Some("https://hooks.example.com/job"),
                "job url should come from file",
            )?;
            ensure(
                config.webhook.negotiation_url.as_deref()
                    == Some("https://hooks.example.com/negotiate"),
                "negotiation url should come from env",
            )?;

            let rejected = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    job_url: Some("hooks.example.com/job".to_string()),
                    ..ConfigOverrides::default()
                },
            });
            ensure(
                matches!(rejected, Err(ConfigError::Validation(ref message)) if message.contains("webhook.job_url")),
                "schemeless job url should be rejected",
            )
        })();

        clear_vars(&["LIFTQUOTE_WEBHOOK_NEGOTIATION_URL"]);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LIFTQUOTE_WEBHOOK_TIMEOUT_SECS", "soon");

        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "LIFTQUOTE_WEBHOOK_TIMEOUT_SECS", "error should name the variable")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
            Ok(_) => Err("expected invalid override failure".to_string()),
        };

        clear_vars(&["LIFTQUOTE_WEBHOOK_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LIFTQUOTE_WEBHOOK_AUTH_TOKEN", "hook-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("hook-secret-value"), "debug output should not contain token")
        })();

        clear_vars(&["LIFTQUOTE_WEBHOOK_AUTH_TOKEN"]);
        result
    }
}
