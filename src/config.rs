use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::logic::ProjectionOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_permissive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_string: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub name: String,
    /// Require TLS without verifying the server certificate
    pub ssl: bool,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub auto_migrate: bool,
    pub load_seed_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// SQL schema that holds the UI definition and record tables
    pub schema: String,
    pub default_product: String,
    pub query_timeout_ms: u64,
    pub truth_tokens: TruthTokens,
    pub parent_reference: ParentReference,
}

/// Which stored spellings of the boolean literals become JSON booleans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruthTokens {
    Upper,
    Lower,
    #[default]
    Both,
}

/// How an element points at its containing element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentReference {
    Id,
    Label,
    #[default]
    Both,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_permissive: true,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            name: "postgres".to_string(),
            ssl: true,
            max_connections: 10,
            acquire_timeout_secs: 5,
            auto_migrate: false,
            load_seed_data: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            schema: "testapi".to_string(),
            default_product: "general".to_string(),
            query_timeout_ms: 5000,
            truth_tokens: TruthTokens::default(),
            parent_reference: ParentReference::default(),
        }
    }
}

/// Flat variable names used by existing deployments, mapped onto config keys
const LEGACY_ENV: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_DATABASE", "database.name"),
    ("DB_SSL", "database.ssl"),
];

impl AppConfig {
    /// Load configuration from defaults, an optional config file and the environment
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "UI_API__"
        config = config.add_source(
            config::Environment::with_prefix("UI_API")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in LEGACY_ENV {
            let value = std::env::var(var).ok().filter(|v| !v.is_empty());
            config = config.set_override_option(*key, value)?;
        }

        let app_config: AppConfig = config.build()?.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !is_identifier(&self.ui.schema) {
            anyhow::bail!("ui.schema must be a plain SQL identifier, got '{}'", self.ui.schema);
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }
        Ok(())
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.ui.query_timeout_ms)
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            truth_tokens: self.ui.truth_tokens,
            parent_reference: self.ui.parent_reference,
        }
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
