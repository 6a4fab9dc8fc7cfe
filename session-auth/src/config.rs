use std::collections::HashMap;
use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Static authentication configuration: named guard entries plus the default
/// guard the facade falls back to.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub default_guard: String,
    pub guards: HashMap<String, GuardConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GuardConfig {
    pub driver: GuardDriver,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Guard driver kinds the registry knows how to build.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GuardDriver {
    Session,
}

/// Provider settings: the ordered uid fields a lookup tries, and the field
/// used as the durable identifier for persistence keys.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_uids")]
    pub uids: Vec<String>,
    #[serde(default = "default_identifier_key")]
    pub identifier_key: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            uids: default_uids(),
            identifier_key: default_identifier_key(),
        }
    }
}

fn default_uids() -> Vec<String> {
    vec!["email".to_string()]
}

fn default_identifier_key() -> String {
    "id".to_string()
}

impl AuthConfig {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__DEFAULT_GUARD, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("AUTH").separator("__"))
            .build()?;

        let config: AuthConfig = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Shorthand for a single session guard registered as the default.
    pub fn single_session_guard(name: &str) -> Self {
        let mut guards = HashMap::new();
        guards.insert(
            name.to_string(),
            GuardConfig {
                driver: GuardDriver::Session,
                provider: ProviderConfig::default(),
            },
        );

        Self {
            default_guard: name.to_string(),
            guards,
        }
    }
}
