//! Self-check configuration
//!
//! Supports multiple profiles (debug, release) with different settings.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Runner behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Upper bound for a single check; unset means wait forever
    pub check_timeout_ms: Option<u64>,
    /// Whether the build metadata check joins the default set
    pub include_build_info: bool,
}

impl RunnerConfig {
    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout_ms.map(Duration::from_millis)
    }
}

/// Key/value storage check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory backing the file store; the platform data dir when unset
    pub dir: Option<PathBuf>,
    /// Key written and removed by the storage check
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: "selfcheck.marker".to_string(),
        }
    }
}

/// Network check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Base URL the ping path is resolved against
    pub base_url: String,
    /// Path requested by the network check
    pub ping_path: String,
    /// Per-request timeout for the HTTP transport
    pub request_timeout_ms: u64,
    /// Raise transport errors instead of describing them in the verdict text
    pub propagate_errors: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            ping_path: "/api/ping".to_string(),
            request_timeout_ms: 2000,
            propagate_errors: false,
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Self-check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfCheckConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    pub runner: RunnerConfig,
    pub storage: StorageConfig,
    pub network: NetworkConfig,
    pub log: LogConfig,
}

impl Default for SelfCheckConfig {
    fn default() -> Self {
        Self {
            profile: "debug".to_string(),
            runner: RunnerConfig::default(),
            storage: StorageConfig::default(),
            network: NetworkConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl SelfCheckConfig {
    /// Loads configuration for the given profile
    ///
    /// Sources, later ones winning:
    /// 1. config/{profile}.toml, next to the executable or in ./config
    /// 2. Environment variables prefixed `SELFCHECK_`, `__` between nested
    ///    fields (e.g. `SELFCHECK_NETWORK__BASE_URL`)
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = match Self::find_config_dir() {
            Some(dir) => {
                builder.add_source(File::from(dir.join(profile).as_path()).required(false))
            }
            None => builder.add_source(File::with_name(&format!("config/{profile}")).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("SELFCHECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.set_override("profile", profile)?.build()?;

        config.try_deserialize()
    }

    /// Loads the profile named by `SELFCHECK_PROFILE`, defaulting to "debug"
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile = std::env::var("SELFCHECK_PROFILE").unwrap_or_else(|_| "debug".to_string());
        Self::load(&profile)
    }

    fn find_config_dir() -> Option<PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = PathBuf::from("config");
        cwd_config.exists().then_some(cwd_config)
    }
}
