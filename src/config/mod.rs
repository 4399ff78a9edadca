// Configuration module entry point
// Loads configuration and builds the process-wide application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::{AppState, StartupError};
pub use types::{
    Config, HttpConfig, LogLevel, LoggingConfig, PerformanceConfig, ServerConfig,
    StaticFilesConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_FILE: &str = "config";

impl Config {
    /// Load configuration from `config.{toml,yaml,json}` in the working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. Environment variables prefixed with `SPA_` override it,
    /// using `__` between nested keys (e.g. `SPA_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SPA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8888)?
            .set_default("server.backlog", 1024)?
            .set_default("static_files.root", ".")?
            .set_default("static_files.index_file", "index.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 60)?
            .set_default("http.server_name", "spa_server")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
