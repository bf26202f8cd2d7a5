use super::models::Config;
use config::{ConfigError, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "NEWSYSLOG_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "/etc/newsyslog.toml";
const ENV_PREFIX: &str = "NEWSYSLOG";
const ENV_SEPARATOR: &str = "__";

/// Path of the root configuration when none is given on the command line.
///
/// `NEWSYSLOG_CONFIG` (also read from a `.env` file) wins over `/etc/newsyslog.toml`.
pub fn default_path() -> PathBuf {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load the root configuration: the TOML file, then environment overrides.
///
/// The file is required. `NEWSYSLOG__COMMON__INCLUDE=/etc/newsyslog.d/*.toml`
/// overrides `common.include`.
pub fn load_from_sources(config_path: &Path) -> Result<Config, ConfigError> {
    tracing::info!("Loading configuration from: {}", config_path.display());

    let config = config::Config::builder()
        .add_source(File::from(config_path).format(FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
        .build()?;
    config.try_deserialize()
}

/// Load an included file. Environment overrides apply to the root file only.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    tracing::debug!("Loading included configuration from: {}", path.display());

    config::Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(true))
        .build()?
        .try_deserialize()
}
