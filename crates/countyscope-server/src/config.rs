use countyscope_core::{ApiKey, ProviderKind};
use countyscope_egress::{
    EgressError, ProviderSet,
    census::{CensusConfig, DatasetRule, DatasetSelector},
    client::HttpClientConfig,
    fred::FredConfig,
    hud::HudConfig,
};
use countyscope_ingress::CorsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub census: CensusSettings,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub census: ProviderSettings,
    #[serde(default)]
    pub fred: ProviderSettings,
    #[serde(default)]
    pub hud: ProviderSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Used when a request does not carry its own key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CensusSettings {
    #[serde(default)]
    pub datasets: DatasetSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSettings {
    #[serde(default = "default_dataset")]
    pub default: String,

    #[serde(default)]
    pub rules: Vec<DatasetRuleSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRuleSettings {
    pub from_year: u16,
    pub dataset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            providers: ProvidersConfig::default(),
            census: CensusSettings::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            default: default_dataset(),
            rules: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl ProviderSettings {
    fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout_secs: self.timeout_secs,
            ..HttpClientConfig::default()
        }
    }

    fn default_key(&self) -> Option<ApiKey> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ApiKey::new)
    }

    fn redact(&mut self) {
        if let Some(key) = self.api_key.as_mut() {
            *key = format!("<redacted {} chars>", key.chars().count());
        }
    }
}

impl DatasetSettings {
    pub fn selector(&self) -> DatasetSelector {
        DatasetSelector {
            default_dataset: self.default.clone(),
            rules: self
                .rules
                .iter()
                .map(|rule| DatasetRule {
                    from_year: rule.from_year,
                    dataset: rule.dataset.clone(),
                })
                .collect(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Provider API keys (no COUNTYSCOPE_ prefix for these)
        for (var, settings) in [
            ("CENSUS_API_KEY", &mut self.providers.census),
            ("FRED_API_KEY", &mut self.providers.fred),
            ("HUD_API_KEY", &mut self.providers.hud),
        ] {
            if let Ok(api_key) = std::env::var(var) {
                settings.api_key = Some(api_key);
            }
        }

        if let Ok(val) = std::env::var("COUNTYSCOPE_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("COUNTYSCOPE_LOG_FORMAT") {
            match val.to_lowercase().as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "text" => self.logging.format = LogFormat::Text,
                _ => eprintln!("Warning: Invalid COUNTYSCOPE_LOG_FORMAT '{}', ignoring", val),
            }
        }

        if let Ok(val) = std::env::var("COUNTYSCOPE_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => eprintln!("Warning: Invalid COUNTYSCOPE_PORT '{}', ignoring", val),
            }
        }

        if let Ok(val) = std::env::var("COUNTYSCOPE_HOST") {
            self.host = val;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }

        for (name, settings) in [
            ("census", &self.providers.census),
            ("fred", &self.providers.fred),
            ("hud", &self.providers.hud),
        ] {
            if let Some(url) = &settings.base_url
                && !(url.starts_with("http://") || url.starts_with("https://"))
            {
                return Err(ConfigError::Invalid(format!(
                    "providers.{}.base_url must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
            if settings.timeout_secs == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "providers.{}.timeout_secs must be greater than zero",
                    name
                )));
            }
        }

        if self.census.datasets.default.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "census.datasets.default must not be empty".to_string(),
            ));
        }
        if let Some(rule) = self
            .census
            .datasets
            .rules
            .iter()
            .find(|r| !(1000..=9999).contains(&r.from_year))
        {
            return Err(ConfigError::Invalid(format!(
                "census.datasets.rules: from_year {} is not a four-digit year",
                rule.from_year
            )));
        }

        Ok(())
    }

    /// Copy of the config safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.providers.census.redact();
        config.providers.fred.redact();
        config.providers.hud.redact();
        config
    }

    pub fn census_config(&self) -> CensusConfig {
        let settings = &self.providers.census;
        let mut config = CensusConfig {
            client_config: settings.client_config(),
            ..CensusConfig::default()
        }
        .with_datasets(self.census.datasets.selector());
        if let Some(url) = &settings.base_url {
            config = config.with_base_url(url);
        }
        config
    }

    pub fn fred_config(&self) -> FredConfig {
        let settings = &self.providers.fred;
        let mut config = FredConfig {
            client_config: settings.client_config(),
            ..FredConfig::default()
        };
        if let Some(url) = &settings.base_url {
            config = config.with_base_url(url);
        }
        config
    }

    /// HUD applies `timeout_secs` per request rather than on the client
    pub fn hud_config(&self) -> HudConfig {
        let settings = &self.providers.hud;
        let mut config = HudConfig::default();
        if let Some(url) = &settings.base_url {
            config = config.with_base_url(url);
        }
        if let Some(secs) = settings.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Build the connectors and attach configured default keys
    pub fn provider_set(&self) -> Result<ProviderSet, EgressError> {
        let mut providers =
            ProviderSet::from_configs(self.census_config(), self.fred_config(), self.hud_config())?;

        for (kind, settings) in [
            (ProviderKind::Census, &self.providers.census),
            (ProviderKind::Fred, &self.providers.fred),
            (ProviderKind::Hud, &self.providers.hud),
        ] {
            if let Some(key) = settings.default_key() {
                providers = providers.with_default_key(kind, key);
            }
        }

        Ok(providers)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_dataset() -> String {
    "acs/acs5".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
