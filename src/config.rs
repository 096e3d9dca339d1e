use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{APP_DIR_NAME, CONFIG_FILE_NAME, OLLAMA_BASE_URL};

/// One configured refinement backend. The API key is not stored here;
/// it lives in the persisted editor snapshot so the engine can compare
/// it against the credential that last failed.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    pub active_model: String,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub active_provider: String,
    pub providers: Vec<ProviderConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            active_provider: "OpenAI".to_string(),
            providers: vec![
                ProviderConfig {
                    name: "OpenAI".to_string(),
                    base_url: "https://api.openai.com/v1".to_string(),
                    active_model: "gpt-5.2".to_string(),
                    system_prompt: None,
                },
                ProviderConfig {
                    name: "DeepSeek".to_string(),
                    base_url: "https://api.deepseek.com/v1".to_string(),
                    active_model: "deepseek-chat".to_string(),
                    system_prompt: None,
                },
                ProviderConfig {
                    name: "Ollama".to_string(),
                    base_url: OLLAMA_BASE_URL.to_string(),
                    active_model: "qwen2.5:0.5b".to_string(),
                    system_prompt: None,
                },
            ],
        }
    }
}

impl AppConfig {
    pub fn config_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR_NAME);
        path
    }

    pub fn config_file() -> PathBuf {
        let mut path = Self::config_dir();
        path.push(CONFIG_FILE_NAME);
        path
    }

    pub fn load() -> Self {
        let path = Self::config_file();
        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(config) = toml::from_str(&content) {
                    return config;
                }
            }
        }
        let default = Self::default();
        let _ = default.save();
        default
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(Self::config_file(), content)?;
        Ok(())
    }

    pub fn get_active_provider(&self) -> Option<&ProviderConfig> {
        self.providers
            .iter()
            .find(|p| p.name == self.active_provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_active_provider_exists() {
        let config = AppConfig::default();
        let active = config.get_active_provider().unwrap();
        assert_eq!(active.name, "OpenAI");
        assert_eq!(active.active_model, "gpt-5.2");
    }

    #[test]
    fn test_unknown_active_provider_yields_none() {
        let mut config = AppConfig::default();
        config.active_provider = "Nonexistent".to_string();
        assert!(config.get_active_provider().is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.active_provider, config.active_provider);
        assert_eq!(back.providers.len(), config.providers.len());
    }
}
