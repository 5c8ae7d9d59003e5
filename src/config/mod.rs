// Configuration module entry point
// Layered settings (file, environment, defaults) and command-line overrides

mod types;

use clap::Parser;

// Re-export public types
pub use types::{Config, HttpConfig, LoggingConfig, ServerConfig, StaticFilesConfig};

/// Environment variable prefix, e.g. `ROUTEKIT__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "ROUTEKIT";

/// Command-line flags
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Minimal HTTP application server")]
pub struct Cli {
    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Configuration file, without extension
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let settings = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("static_files.enabled", defaults.static_files.enabled)?
            .set_default("static_files.root", defaults.static_files.root)?
            .set_default(
                "http.max_body_size",
                i64::try_from(defaults.http.max_body_size).unwrap_or(i64::MAX),
            )?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
