//! Typed configuration. Defaults carry the fixed constants the agent was
//! tuned with; the binary overrides them from CLI flags and the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::{CLEANED_TEXT_MAX_CHARS, MAX_STEPS_PER_QUERY};

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_USER_AGENT: &str = concat!("scrape-agent/", env!("CARGO_PKG_VERSION"));

/// Language-model endpoint and sampling parameters.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub stop: Vec<String>,
    pub request_timeout: Duration,
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            temperature: 0.4,
            max_tokens: 1024,
            top_p: 0.9,
            stop: vec!["<|eot_id|>".to_string()],
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Extra attempts after a transient failure. 0 disables retrying.
    pub retries: u32,
    pub retry_backoff: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub sandbox: bool,
    /// How long to wait for `wait_for` before giving up.
    pub wait_timeout: Duration,
    pub navigation_timeout: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            sandbox: true,
            wait_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CleanerConfig {
    pub max_chars: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            max_chars: CLEANED_TEXT_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AgentConfig {
    pub max_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: MAX_STEPS_PER_QUERY,
        }
    }
}
