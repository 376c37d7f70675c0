//! Locating and reading the CLI configuration file.
//!
//! A path given on the command line must exist. Otherwise the first file
//! found among `compass/config.toml` and the platform config directory is
//! used, and the defaults apply when neither exists.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use compass::{CompassError, config::AppConfig};

const LOCAL_CONFIG: &str = "compass/config.toml";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file {0} does not exist")]
    MissingFile(PathBuf),

    #[error("Configuration file {path} is not valid TOML: {message}")]
    Malformed { path: PathBuf, message: String },
}

impl From<ConfigError> for CompassError {
    fn from(err: ConfigError) -> Self {
        let kind = match err {
            ConfigError::MissingFile(_) => io::ErrorKind::NotFound,
            ConfigError::Malformed { .. } => io::ErrorKind::InvalidData,
        };
        CompassError::Io(io::Error::new(kind, err.to_string()))
    }
}

/// Loads the configuration the run should use.
///
/// # Errors
///
/// Fails when an explicit path does not exist, when the chosen file is not
/// a valid configuration, or when it holds an out-of-range threshold or
/// confidence.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, CompassError> {
    let located = match explicit_path {
        Some(path) => Some(explicit(path.as_ref())?),
        None => discover(),
    };

    match located {
        Some(path) => read(&path),
        None => {
            debug!("No configuration file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn explicit(path: &Path) -> Result<PathBuf, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    info!(path = path.display().to_string(); "Using configuration from the command line");
    Ok(path.to_path_buf())
}

fn discover() -> Option<PathBuf> {
    let platform = ProjectDirs::from("com", "compass", "compass")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME));
    if platform.is_none() {
        debug!("Platform configuration directory is unknown");
    }

    [Some(PathBuf::from(LOCAL_CONFIG)), platform]
        .into_iter()
        .flatten()
        .find(|candidate| {
            let found = candidate.is_file();
            debug!(path = candidate.display().to_string(), found; "Looking for configuration");
            found
        })
        .inspect(|path| {
            info!(path = path.display().to_string(); "Using configuration file");
        })
}

/// Parses a configuration file and checks its value ranges.
fn read(path: &Path) -> Result<AppConfig, CompassError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Malformed {
        path: path.to_path_buf(),
        message: err.message().trim_end().to_string(),
    })?;

    config.compass().equality_threshold()?;
    config.compass().automatic_feedback_confidence()?;
    Ok(config)
}
