use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::paths::{
    DEFAULT_CHANNELS_PATH, DEFAULT_CHECKPOINT_PATH, DEFAULT_ENV_PATH, DEFAULT_OUTPUT_PATH,
};

pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const API_BASE_VAR: &str = "YOUTUBE_API_BASE";
pub const CHANNELS_FILE_VAR: &str = "MPVL_CHANNELS_FILE";
pub const CHECKPOINT_FILE_VAR: &str = "MPVL_CHECKPOINT_FILE";
pub const OUTPUT_FILE_VAR: &str = "MPVL_OUTPUT_FILE";

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
/// Upper bound the playlistItems endpoint accepts for `maxResults`.
pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_PAGE_SIZE: u32 = MAX_PAGE_SIZE;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key is missing: set YOUTUBE_API_KEY in the environment or in {env_file}")]
    MissingCredential { env_file: String },
    #[error("reading {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenv::Error,
    },
    #[error("page size must be between 1 and 50, got {0}")]
    InvalidPageSize(u32),
}

/// Everything the job needs, resolved once at startup and passed down.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub channels_path: PathBuf,
    pub checkpoint_path: PathBuf,
    pub output_path: PathBuf,
    pub page_size: u32,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("channels_path", &self.channels_path)
            .field("checkpoint_path", &self.checkpoint_path)
            .field("output_path", &self.output_path)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub channels_path: Option<PathBuf>,
    pub checkpoint_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub env_path: Option<PathBuf>,
    pub api_base: Option<String>,
    pub page_size: Option<u32>,
}

pub fn resolve_config(overrides: ConfigOverrides) -> Result<Config, ConfigError> {
    let env_path = overrides
        .env_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_PATH));
    let file_vars = read_env_file(&env_path)?;
    build_config(&file_vars, env_var_string, overrides, &env_path)
}

fn build_config(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: ConfigOverrides,
    env_path: &Path,
) -> Result<Config, ConfigError> {
    let api_key = lookup_value(API_KEY_VAR, file_vars, &env_lookup).ok_or_else(|| {
        ConfigError::MissingCredential {
            env_file: env_path.display().to_string(),
        }
    })?;

    let page_size = overrides.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ConfigError::InvalidPageSize(page_size));
    }

    let api_base = overrides
        .api_base
        .filter(|value| !value.trim().is_empty())
        .or_else(|| lookup_value(API_BASE_VAR, file_vars, &env_lookup))
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    let path_for = |override_path: Option<PathBuf>, key: &str, default: &str| {
        override_path
            .or_else(|| lookup_value(key, file_vars, &env_lookup).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(default))
    };

    Ok(Config {
        api_key,
        api_base,
        channels_path: path_for(
            overrides.channels_path,
            CHANNELS_FILE_VAR,
            DEFAULT_CHANNELS_PATH,
        ),
        checkpoint_path: path_for(
            overrides.checkpoint_path,
            CHECKPOINT_FILE_VAR,
            DEFAULT_CHECKPOINT_PATH,
        ),
        output_path: path_for(overrides.output_path, OUTPUT_FILE_VAR, DEFAULT_OUTPUT_PATH),
        page_size,
        connect_timeout: CONNECT_TIMEOUT,
        read_timeout: READ_TIMEOUT,
    })
}

fn env_var_string(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Process environment wins over the dotenv file; blank values count as unset.
fn lookup_value(
    key: &str,
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    env_lookup(key).or_else(|| {
        file_vars
            .get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Reads `KEY=value` pairs from a dotenv file without touching the process
/// environment. A missing file yields no vars.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let env_file_error = |source| ConfigError::EnvFile {
        path: path.display().to_string(),
        source,
    };
    dotenv::from_path_iter(path)
        .map_err(env_file_error)?
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(env_file_error)
}
