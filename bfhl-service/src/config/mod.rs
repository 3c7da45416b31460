use crate::services::ai::AI_TIMEOUT;
use crate::services::providers::gemini::{GeminiConfig, GEMINI_API_BASE};
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Identity string used when `OFFICIAL_EMAIL` is unset outside production.
const DEFAULT_OFFICIAL_EMAIL: &str = "official@example.com";

const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

#[derive(Debug, Clone)]
pub struct BfhlConfig {
    pub common: core_config::Config,
    pub official_email: String,
    pub gemini: GeminiSettings,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// Absent key is allowed; AI requests then report the service as unconfigured.
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
}

impl BfhlConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut common = core_config::Config::load()?;
        if let Ok(port) = env::var("PORT") {
            common.port = port
                .parse()
                .map_err(|e| AppError::config(format!("PORT is not a valid port: {}", e)))?;
        }

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Secret::new);
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; AI requests will be rejected");
        }

        Ok(BfhlConfig {
            common,
            official_email: get_env("OFFICIAL_EMAIL", Some(DEFAULT_OFFICIAL_EMAIL), is_prod)?,
            gemini: GeminiSettings {
                api_key,
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL), false)?,
                api_base: get_env("GEMINI_API_BASE", Some(GEMINI_API_BASE), false)?,
            },
        })
    }

    /// Provider settings with the fixed AI timeout applied.
    pub fn gemini_provider_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini.api_key.clone(),
            model: self.gemini.model.clone(),
            api_base: self.gemini.api_base.clone(),
            timeout: AI_TIMEOUT,
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::config(format!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::config(format!("{} is required but not set", key)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_get_env_falls_back_to_default() {
        let value = get_env("BFHL_TEST_SURELY_UNSET_VAR", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_get_env_requires_value_in_prod() {
        let err = get_env("BFHL_TEST_SURELY_UNSET_VAR", Some("fallback"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn test_get_env_without_default() {
        assert!(get_env("BFHL_TEST_SURELY_UNSET_VAR", None, false).is_err());
    }

    #[test]
    fn test_provider_config_uses_fixed_timeout() {
        let config = BfhlConfig {
            common: core_config::Config { port: 0 },
            official_email: "me@example.com".to_string(),
            gemini: GeminiSettings {
                api_key: Some(Secret::new("key".to_string())),
                model: "gemini-pro".to_string(),
                api_base: GEMINI_API_BASE.to_string(),
            },
        };
        let provider = config.gemini_provider_config();
        assert_eq!(provider.timeout, AI_TIMEOUT);
        assert_eq!(provider.api_key.unwrap().expose_secret(), "key");
    }
}
