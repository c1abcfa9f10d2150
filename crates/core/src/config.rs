use std::{
    collections::HashMap,
    fs::{self, File},
    io::Write,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    assets::{get_config_dir, get_default_config},
    model::{ModelConfig, ModelProvider},
};

pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";
pub const IMGFLIP_USERNAME_ENV: &str = "IMGFLIP_USERNAME";
pub const IMGFLIP_PASSWORD_ENV: &str = "IMGFLIP_PASSWORD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File system error: {0}")]
    IO(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YAMLError(#[from] serde_yaml::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModeConfig {
    pub model: ModelConfig,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WebConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngineKind {
    #[default]
    Tesseract,
    Leptess,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OcrConfig {
    #[serde(default)]
    pub engine: OcrEngineKind,
    #[serde(default = "default_ocr_binary")]
    pub binary: String,
    #[serde(default = "default_ocr_language")]
    pub language: String,
    /// Tessdata directory, the engine default when unset.
    #[serde(default)]
    pub data_path: Option<String>,
}

fn default_ocr_binary() -> String {
    "tesseract".to_string()
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::default(),
            binary: default_ocr_binary(),
            language: default_ocr_language(),
            data_path: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Config {
    pub models: HashMap<String, ModelConfig>,
    pub chat: ModeConfig,
    pub task: ModeConfig,
    pub web: WebConfig,
    pub ocr: OcrConfig,
    /// Provider specific meme settings, interpreted by the meme tool.
    pub meme: serde_yaml::Value,
}

impl Config {
    /// Applies environment overrides on top of the file configuration.
    ///
    /// `lookup` resolves a variable name, usually `std::env::var(..).ok()`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(OLLAMA_HOST_ENV).filter(|h| !h.is_empty()) {
            debug!(%host, "Overriding ollama host from environment");
            let ollama_models = self
                .models
                .values_mut()
                .chain([&mut self.chat.model, &mut self.task.model])
                .filter(|m| m.provider == ModelProvider::Ollama);
            for model in ollama_models {
                model.set_setting("host", host.as_str());
            }
        }

        for (var, key) in [
            (IMGFLIP_USERNAME_ENV, "username"),
            (IMGFLIP_PASSWORD_ENV, "password"),
        ] {
            if let Some(value) = lookup(var) {
                if !self.meme.is_mapping() {
                    self.meme = serde_yaml::Value::Mapping(Default::default());
                }
                if let Some(mapping) = self.meme.as_mapping_mut() {
                    mapping.insert(key.into(), value.into());
                }
            }
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum StringOrObject<T> {
    String(String),
    Object(T),
}

#[derive(Deserialize, Debug)]
struct RawConfig {
    #[serde(default)]
    models: HashMap<String, ModelConfig>,
    chat: RawModeConfig,
    task: RawModeConfig,
    #[serde(default)]
    web: WebConfig,
    #[serde(default)]
    ocr: OcrConfig,
    #[serde(default)]
    meme: serde_yaml::Value,
}

#[derive(Deserialize, Debug)]
struct RawModeConfig {
    model: StringOrObject<ModelConfig>,
    #[serde(default = "default_temperature")]
    temperature: f32,
}

impl RawConfig {
    #[instrument]
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut models_with_names = HashMap::new();
        for (k, v) in &self.models {
            let model_name = if v.name.is_empty() {
                k.clone()
            } else {
                v.name.clone()
            };
            let model = ModelConfig {
                name: model_name,
                ..v.clone()
            };
            models_with_names.insert(k.clone(), model);
        }

        let resolve_mode = |mode: &RawModeConfig| -> Result<ModeConfig, ConfigError> {
            let model = match &mode.model {
                StringOrObject::String(s) => models_with_names
                    .get(s)
                    .cloned()
                    .ok_or_else(|| ConfigError::Config(format!("Model '{s}' not found")))?,
                StringOrObject::Object(m) => m.clone(),
            };
            Ok(ModeConfig {
                model,
                temperature: mode.temperature,
            })
        };

        let chat = resolve_mode(&self.chat)?;
        let task = resolve_mode(&self.task)?;

        Ok(Config {
            models: models_with_names,
            chat,
            task,
            web: self.web.clone(),
            ocr: self.ocr.clone(),
            meme: self.meme.clone(),
        })
    }
}

#[instrument(skip(config_path))]
pub fn create_or_get_config_file(
    config_path: Option<PathBuf>,
) -> Result<(bool, PathBuf), ConfigError> {
    let actual_path = config_path.unwrap_or_else(|| get_config_dir().join("llamadesk.yml"));

    let parent_dir = actual_path.parent().ok_or_else(|| {
        ConfigError::IO(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Config path has no parent directory",
        ))
    })?;

    if !parent_dir.exists() {
        fs::create_dir_all(parent_dir)?;
    }

    if actual_path.exists() {
        Ok((true, actual_path))
    } else {
        File::create(&actual_path)?.write_all(get_default_config().as_bytes())?;
        Ok((false, actual_path))
    }
}

/// Loads the configuration file, without environment overrides.
#[instrument(skip(config_path))]
pub fn get_config(config_path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let (_, config_file) = create_or_get_config_file(config_path)?;
    let content = fs::read_to_string(&config_file)?;
    let raw: RawConfig = serde_yaml::from_str(&content)?;
    raw.to_config()
}

/// Loads the configuration file and applies the process environment on top.
pub fn load_config(config_path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let mut config = get_config(config_path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}
