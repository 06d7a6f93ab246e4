use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the pims client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PimsConfig {
    /// Workflow backend connection
    pub backend: BackendConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Bulk action behaviour
    pub bulk: BulkConfig,
    /// Status graph settings
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the REST backend, without the `/api` suffix
    pub base_url: String,
    /// Bearer token (can be set via env var)
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Client-side request pacing
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit structured JSON logs instead of plain text
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkConfig {
    /// Prior retry attempts after which another retry needs confirmation
    pub confirm_after_attempts: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Optional TOML transition table shared with the backend
    pub graph_path: Option<String>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            confirm_after_attempts: 2,
        }
    }
}

impl Default for PimsConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:5000".to_string(),
                token: None, // Will be read from env var or .pims-rc
                timeout_seconds: 30,
                rate_limit: RateLimitConfig {
                    requests_per_second: 5,
                    burst_capacity: 10,
                },
            },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                json_logs: true,
            },
            bulk: BulkConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl PimsConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (pims.toml, .pims-rc)
    /// 3. Environment variables (prefixed with PIMS_)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&PimsConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("pims.toml").exists() {
            builder = builder.add_source(File::with_name("pims"));
        }

        if Path::new(".pims-rc").exists() {
            builder = builder.add_source(
                File::with_name(".pims-rc").format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(Self::environment());

        let config = builder.build()?;

        let mut pims_config: PimsConfig = config.try_deserialize()?;

        // Special handling for the access token - check the short variable too
        if pims_config.backend.token.is_none() {
            if let Ok(token) = std::env::var("PIMS_ACCESS_TOKEN") {
                pims_config.backend.token = Some(token);
            }
        }

        Ok(pims_config)
    }

    /// `PIMS_BACKEND__BASE_URL` style keys; a single underscore would split base_url itself
    fn environment() -> Environment {
        Environment::with_prefix("PIMS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<PimsConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = PimsConfig::load_env_file();
        PimsConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static PimsConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
