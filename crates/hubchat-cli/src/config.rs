//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_TITLE: &str =
    "GenAI Chat PoC: Intelligent Knowledge Retrieval for Amnesty’s Knowledge Hub";

pub const DEFAULT_INTRO: &str = r#"### Welcome to GenAI Chat

This Proof of Concept (PoC) demonstrates how an AI-powered assistant can help you find and retrieve knowledge from Amnesty's Knowledge Hub efficiently. Feel free to ask any questions related to Amnesty's vast pool of information, and let the AI assist you in real time.

**Features include:**
- Natural Language Question Answering
- Continuous Contextual Understanding
- Real-time Interactive Conversations

To begin, simply type your question below.
"#;

/// Configuration for hubchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenAI API key (alternative to OPENAI_API_KEY)
    pub api_key: Option<String>,
    /// Assistant to chat with (alternative to ASSISTANT_ID)
    pub assistant_id: Option<String>,
    /// API base URL, for proxies and compatible servers
    pub base_url: Option<String>,
    /// Page title
    pub title: Option<String>,
    /// Markdown shown under the title before the first question
    pub intro: Option<String>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// Color theme: "dark" or "light"
    pub theme: Option<String>,
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hubchat")
    }

    /// Config file path; HUBCHAT_CONFIG_PATH overrides the default location
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("HUBCHAT_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Self::default()
            }),
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Write the commented example config if no config file exists yet
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, example_config())?;
        Ok(path)
    }

    /// API key: config file, then OPENAI_API_KEY
    pub fn api_key(&self) -> Option<String> {
        resolve(None, self.api_key.clone(), std::env::var("OPENAI_API_KEY").ok())
    }

    /// Assistant id: command line, then config file, then ASSISTANT_ID
    pub fn assistant_id(&self, from_args: Option<String>) -> Option<String> {
        resolve(
            from_args,
            self.assistant_id.clone(),
            std::env::var("ASSISTANT_ID").ok(),
        )
    }

    pub fn base_url(&self, from_args: Option<String>) -> Option<String> {
        resolve(from_args, self.base_url.clone(), None)
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn intro(&self) -> &str {
        self.intro.as_deref().unwrap_or(DEFAULT_INTRO)
    }
}

/// First non-blank value in precedence order
fn resolve(
    from_args: Option<String>,
    from_config: Option<String>,
    from_env: Option<String>,
) -> Option<String> {
    [from_args, from_config, from_env]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# hubchat configuration file
# Place at ~/.config/hubchat/config.toml (Linux), ~/Library/Application Support/hubchat/config.toml (Mac)
# or %APPDATA%\hubchat\config.toml (Windows), or point HUBCHAT_CONFIG_PATH at it.

# OpenAI API key (optional - OPENAI_API_KEY is used when unset)
# It's recommended to use the environment variable instead for security
# api_key = "sk-..."

# Assistant to chat with (optional - ASSISTANT_ID is used when unset)
# assistant_id = "asst_..."

# API base URL (optional)
# base_url = "https://api.openai.com/v1"

# Page title and intro markdown (optional)
# title = "My Knowledge Hub"
# intro = """
# Ask me anything about the knowledge base.
# """

# Whether to use TUI mode by default (true by default)
# Set to false for simple stdin/stdout mode
tui = true

# Color theme (dark, light)
theme = "dark"
"#
}
