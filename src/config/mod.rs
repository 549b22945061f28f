//!
//! Configuration structures and utilities for wiring up request handling.
//!
//! A configuration can be created in many ways:
//! - From an environment-specific TOML file via `Config::from_rust_env` or `Config::from_toml_file`
//! - From a TOML string via `Config::from_toml`
//! - Constructed programmatically via the builder methods on `Config`
//!
//! In both TOML-based methods, environment variables can be referenced in the TOML
//! using the {{ VAR_NAME }} syntax, and they will be substituted with the corresponding
//! environment variable value. This is done via the `replace_handlebars_with_env`
//! function and keeps API keys out of the TOML files.
//!
//! Configuration is split into logical sections, each represented by their own struct:
//!
//! - `LoggingConfig` for logging and tracing settings
//! - `RequestConfig` for the headers, arguments and defaults of the request parsers
//! - `RoutingConfig` for controller lookup paths and routing rules
//! - `AnalyticsConfig` for analytics events on request results
//!
mod analytics;
mod logging;
mod request;
mod routing;

pub use analytics::*;
pub use logging::*;
pub use request::*;
pub use routing::*;

use {
    crate::{
        Error, EventLogger, FrontController, Request, RequestResultHandler, Response, Result,
        ValueKey, utils::{Sensitive, replace_handlebars_with_env},
    },
    serde::Deserialize,
    std::{env, fs, path::PathBuf, str::FromStr, sync::Arc},
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl Default for Config {
    ///
    /// Creates a default configuration.
    /// This will attempt to load configuration from the file based on the RUST_ENV
    /// environment variable falling back to a default configuration if the environment
    /// variable is not set. Configuration files should be located in the "config/"
    /// directory of your project.
    ///
    fn default() -> Self {
        match Self::from_rust_env() {
            Ok(config) => config,
            Err(_) => Self::builtin(),
        }
    }
}

impl Config {
    /// The configuration used when no file is found.
    pub fn builtin() -> Self {
        Config {
            logging: LoggingConfig::default(),
            request: RequestConfig::default(),
            routing: RoutingConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }

    ///
    /// Loads the configuration from a file based on the RUST_ENV environment variable.
    ///
    pub fn from_rust_env() -> Result<Config> {
        Self::from_toml_file(env::var("RUST_ENV")?)
    }

    ///
    /// Given an environment name, loads the corresponding configuration file,
    /// substitutes any environment variables, and returns a Config struct.
    /// The configuration file is expected to be located at "config/{env}.toml"
    /// where {env} is the provided environment name (e.g., "dev", "prod").
    ///
    pub fn from_toml_file(env: impl AsRef<str>) -> Result<Config> {
        let path = format!("config/{}.toml", env.as_ref());
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    ///
    /// Parses a configuration string in TOML format into a Config struct.
    ///
    pub fn from_toml(toml_str: &str) -> Result<Config> {
        toml_str.parse()
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    pub fn with_entry_point(mut self, entry_point: &str) -> Self {
        self.request.entry_point = entry_point.into();
        self
    }

    pub fn with_analytics_default(mut self, enabled: bool) -> Self {
        self.request.analytics_default = enabled;
        self
    }

    /// Adds an API key identifying `client`.
    pub fn with_api_key(mut self, key: &str, client: &str) -> Self {
        self.request.api_keys.push(ApiKeyConfig {
            key: Sensitive::from(key),
            client: client.into(),
        });
        self
    }

    pub fn with_source_extension(mut self, extension: &str) -> Self {
        self.routing.source_extension = extension.into();
        self
    }

    /// Adds a controller lookup path, searched after the ones already present.
    pub fn with_lookup_path(mut self, id: &str, path: impl Into<PathBuf>) -> Self {
        self.routing.lookup_paths.push(LookupPathConfig {
            id: id.into(),
            path: path.into(),
        });
        self
    }

    /// Restricts the lookup paths searched for `call`. No ids means all of them.
    pub fn with_routing_rule(mut self, call: &str, paths: &[&str]) -> Self {
        self.routing.rules.push(RoutingRuleConfig {
            call: call.into(),
            paths: paths.iter().map(|id| id.to_string()).collect(),
            deny: false,
        });
        self
    }

    pub fn with_denied_call(mut self, call: &str) -> Self {
        self.routing.rules.push(RoutingRuleConfig {
            call: call.into(),
            paths: Vec::new(),
            deny: true,
        });
        self
    }

    pub fn with_analytics(mut self, enabled: bool) -> Self {
        self.analytics.enabled = enabled;
        self
    }

    pub fn with_analytics_code(mut self, code: u16, event: &str) -> Self {
        self.analytics.codes.push(AnalyticsCodeConfig {
            code,
            event: event.into(),
        });
        self
    }

    pub fn with_analytics_tag(mut self, name: &str, value: ValueKey) -> Self {
        self.analytics.tags.push(AnalyticsTagConfig {
            name: name.into(),
            value,
        });
        self
    }

    /// Ensures that the configuration is valid.
    /// Every value has a default, so this only rejects values that are set but
    /// unusable or that contradict each other.
    pub fn validate(&self) -> Result<()> {
        self.logging.validate()?;
        self.request.validate()?;
        self.routing.validate()?;
        self.analytics.validate()?;
        Ok(())
    }

    ///
    /// Sets up the tracing subscriber for logging based on the LoggingConfig.
    ///
    /// NOTE: This should be called early during startup to ensure logging is configured
    ///       before any log messages are emitted.
    ///
    pub fn setup_tracing(&self) {
        use tracing_subscriber::{EnvFilter, prelude::*};
        let env_filter = EnvFilter::from_default_env();
        match self.logging.format {
            LogFormat::Json => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().json())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Default => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Compact => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().compact())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Pretty => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .with(env_filter)
                    .try_init();
            }
        }
    }

    ///
    /// Builds a front controller for `request` with the configured routing, and a
    /// result handler writing to `response` with the configured analytics.
    ///
    pub fn front_controller(
        &self,
        request: Arc<Request>,
        response: Arc<Response>,
        event_logger: Arc<dyn EventLogger>,
    ) -> FrontController {
        let mut handler = RequestResultHandler::new(request.clone(), response);
        self.analytics.enable(&mut handler, event_logger);
        let mut front_controller = FrontController::new(request, handler);
        self.routing.apply(&mut front_controller);
        front_controller
    }
}

///
/// Parses a configuration string with references to environment variables
/// into a Config struct by substituting the environment variables and then
/// parsing the resulting TOML.
///
impl FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let config_file = replace_handlebars_with_env(s);
        let config = toml::from_str::<Config>(&config_file)?;
        Ok(config)
    }
}
