use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::core::prompt;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ASSISTANT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TEXT_MODEL: &str = "llama-3.1-70b-versatile";
pub const DEFAULT_VISION_MODEL: &str = "llama-3.2-90b-vision-preview";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_CHUNK_LIMIT: usize = 1024;
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 1;

/// Environment variable holding the assistant API key. The key never lives
/// in the config file.
pub const API_KEY_ENV: &str = "ROADWATCH_API_KEY";

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Detection backend base URL (REST + event channel)
    pub backend_url: Option<String>,
    /// OpenAI-compatible completion endpoint for the assistant
    pub assistant_base_url: Option<String>,
    pub text_model: Option<String>,
    pub vision_model: Option<String>,
    pub max_tokens: Option<u32>,
    /// Character count per seeded context chunk
    pub chunk_limit: Option<usize>,
    /// Tick period of the simulated-typing reveal, in milliseconds
    pub reveal_interval_ms: Option<u64>,
    /// File replacing the built-in project brief seeded into training chats
    pub project_brief: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "roadwatch")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    pub fn backend_url(&self) -> &str {
        self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    pub fn assistant_base_url(&self) -> &str {
        self.assistant_base_url
            .as_deref()
            .unwrap_or(DEFAULT_ASSISTANT_BASE_URL)
    }

    pub fn text_model(&self) -> &str {
        self.text_model.as_deref().unwrap_or(DEFAULT_TEXT_MODEL)
    }

    pub fn vision_model(&self) -> &str {
        self.vision_model.as_deref().unwrap_or(DEFAULT_VISION_MODEL)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn chunk_limit(&self) -> usize {
        self.chunk_limit.unwrap_or(DEFAULT_CHUNK_LIMIT)
    }

    pub fn reveal_interval_ms(&self) -> u64 {
        self.reveal_interval_ms.unwrap_or(DEFAULT_REVEAL_INTERVAL_MS)
    }

    /// The project brief text seeded into training chats: the configured
    /// replacement file when present and readable, the built-in brief
    /// otherwise.
    pub fn project_brief_text(&self) -> String {
        if let Some(path) = &self.project_brief {
            match fs::read_to_string(path) {
                Ok(contents) => return contents,
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to read project brief {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }
        prompt::PROJECT_BRIEF.to_string()
    }

    /// Assistant API key from the environment.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty())
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  backend-url: {}", self.backend_url());
        println!("  assistant-base-url: {}", self.assistant_base_url());
        println!("  text-model: {}", self.text_model());
        println!("  vision-model: {}", self.vision_model());
        println!("  max-tokens: {}", self.max_tokens());
        println!("  chunk-limit: {}", self.chunk_limit());
        println!("  reveal-interval-ms: {}", self.reveal_interval_ms());
        match &self.project_brief {
            Some(path) => println!("  project-brief: {}", path.display()),
            None => println!("  project-brief: (built-in)"),
        }
    }
}
