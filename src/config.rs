use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::infra::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const CONFIG_DIR_ENV: &str = "TRIAGE_CONFIG_DIR";
const CONFIG_FILE_NAME: &str = "config.json";
const TICKETS_FILE_NAME: &str = "tickets.json";
const DEFAULT_UTC_OFFSET: &str = "+00:00";

const API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";
const MODEL_ENV: &str = "HUGGINGFACE_MODEL";
const INFERENCE_URL_ENV: &str = "TRIAGE_INFERENCE_URL";
const TICKETS_FILE_ENV: &str = "TRIAGE_TICKETS_FILE";
const UTC_OFFSET_ENV: &str = "TRIAGE_UTC_OFFSET";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` is a supported state: classification then always returns the default.
    pub api_key: Option<String>,
    pub model: String,
    pub inference_url: String,
    pub tickets_file: PathBuf,
    pub utc_offset: FixedOffset,
}

/// Values persisted by `triage config init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub inference_url: Option<String>,
    pub tickets_file: Option<String>,
    pub utc_offset: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid config file: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

impl AppConfig {
    /// Stored config file, overridden by environment variables.
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(stored, |key| env::var(key).ok(), &config_directory()?)
    }

    fn resolve(
        stored: StoredConfig,
        env_var: impl Fn(&str) -> Option<String>,
        config_dir: &Path,
    ) -> AppResult<Self> {
        let pick = |key: &str, stored: Option<String>| {
            env_var(key)
                .or(stored)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = pick(API_KEY_ENV, stored.api_key);
        let model = pick(MODEL_ENV, stored.model).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let inference_url = pick(INFERENCE_URL_ENV, stored.inference_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let tickets_file = pick(TICKETS_FILE_ENV, stored.tickets_file)
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.join(TICKETS_FILE_NAME));
        let utc_offset = parse_utc_offset(
            &pick(UTC_OFFSET_ENV, stored.utc_offset)
                .unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string()),
        )?;

        Ok(Self {
            api_key,
            model,
            inference_url,
            tickets_file,
            utc_offset,
        })
    }
}

pub fn parse_utc_offset(value: &str) -> AppResult<FixedOffset> {
    value.parse::<FixedOffset>().map_err(|err| {
        AppError::Configuration(format!(
            "invalid UTC offset '{value}' (expected e.g. +02:00): {err}"
        ))
    })
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("triage"))
        .ok_or_else(|| AppError::Configuration("could not determine config directory".to_string()))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
