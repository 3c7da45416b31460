use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load the shared settings from `configuration.*` (optional) and `APP__*`
    /// environment variables, after pulling in a local `.env` file.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_when_missing() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_port_is_read_when_present() {
        let config: Config = serde_json::from_str(r#"{"port": 8081}"#).unwrap();
        assert_eq!(config.port, 8081);
    }
}
