//! Settings read from the environment (and `.env`, loaded in `main`).

use std::time::Duration;

use thiserror::Error;

use crate::quiz::ai_helper::Model;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("unknown model {0:?}, expected gpt-3.5-turbo or gpt-4")]
    UnknownModel(String),
}

/// Present when updates should arrive through a webhook instead of long polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub telegram_token: String,
    pub chatgpt_api_key: String,
    pub model: Model,
    pub request_timeout: Duration,
    pub webhook: Option<WebhookConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let telegram_token = require("TELEGRAM_TOKEN")?;
        let chatgpt_api_key = require("CHATGPT_API_KEY")?;

        let model = match get("MCQ_MODEL") {
            Some(name) => name.parse::<Model>().map_err(ConfigError::UnknownModel)?,
            None => Model::default(),
        };

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "REQUEST_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let webhook = match get("WEBHOOK_URL") {
            Some(url) => {
                let port = match get("PORT") {
                    Some(value) => value
                        .trim()
                        .parse::<u16>()
                        .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
                    None => DEFAULT_PORT,
                };
                Some(WebhookConfig {
                    url: url.trim().to_string(),
                    port,
                })
            }
            None => None,
        };

        Ok(Self {
            telegram_token,
            chatgpt_api_key,
            model,
            request_timeout,
            webhook,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("TELEGRAM_TOKEN", "123:abc"), ("CHATGPT_API_KEY", "sk-test")];

    #[test]
    fn defaults_with_required_only() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(
            config,
            Config {
                telegram_token: "123:abc".to_string(),
                chatgpt_api_key: "sk-test".to_string(),
                model: Model::Gpt35Turbo,
                request_timeout: Duration::from_secs(30),
                webhook: None,
            }
        );
    }

    #[test]
    fn missing_variables_are_named() {
        assert_eq!(load(&[]), Err(ConfigError::Missing("TELEGRAM_TOKEN")));
        assert_eq!(
            load(&[("TELEGRAM_TOKEN", "123:abc"), ("CHATGPT_API_KEY", "  ")]),
            Err(ConfigError::Missing("CHATGPT_API_KEY"))
        );
    }

    #[test]
    fn model_and_timeout_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MCQ_MODEL", "gpt-4"));
        vars.push(("REQUEST_TIMEOUT_SECS", "15"));
        let config = load(&vars).unwrap();
        assert_eq!(config.model, Model::Gpt4);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn unknown_model_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MCQ_MODEL", "gemini-1.5-pro"));
        assert_eq!(
            load(&vars),
            Err(ConfigError::UnknownModel("gemini-1.5-pro".to_string()))
        );
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("REQUEST_TIMEOUT_SECS", "0"));
        assert_eq!(
            load(&vars),
            Err(ConfigError::Invalid {
                key: "REQUEST_TIMEOUT_SECS",
                value: "0".to_string()
            })
        );
    }

    #[test]
    fn webhook_mode_defaults_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("WEBHOOK_URL", "https://bot.example.com/webhook"));
        let webhook = load(&vars).unwrap().webhook.unwrap();
        assert_eq!(webhook.url, "https://bot.example.com/webhook");
        assert_eq!(webhook.port, 3000);

        vars.push(("PORT", "8443"));
        assert_eq!(load(&vars).unwrap().webhook.unwrap().port, 8443);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("WEBHOOK_URL", "https://bot.example.com/webhook"));
        vars.push(("PORT", "not-a-port"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
    }
}
