//! Query in, answer out: the agent loop followed by the optional
//! formatting pass.

use std::sync::Arc;

use serde::Serialize;

use crate::agent::Agent;
use crate::brain::{Brain, ChatModel};
use crate::config::{AgentConfig, CleanerConfig, FetchConfig, ModelConfig, RenderConfig};
use crate::dom::Cleaner;
use crate::fetch::HttpFetcher;
use crate::formatter::Formatter;
use crate::hands::ChromeRenderer;

/// Either a raw answer (with its formatted rendering when that worked) or
/// a single classified error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScrapeOutcome {
    Answer {
        raw_data: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        formatted: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        format_error: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl ScrapeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeOutcome::Answer { .. })
    }
}

pub struct Pipeline {
    agent: Agent,
    formatter: Option<Formatter>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub model: ModelConfig,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
    pub cleaner: CleanerConfig,
    pub agent: AgentConfig,
    pub format_output: bool,
}

impl Pipeline {
    pub fn new(agent: Agent, formatter: Option<Formatter>) -> Self {
        Self { agent, formatter }
    }

    /// Wire the real HTTP, Chrome and model adapters together.
    pub fn from_config(config: PipelineConfig) -> anyhow::Result<Self> {
        let cleaner = Cleaner::new(&config.cleaner);
        let model: Arc<dyn ChatModel> = Arc::new(Brain::new(config.model)?);
        let fetcher = Arc::new(HttpFetcher::new(config.fetch, cleaner)?);
        let renderer = Arc::new(ChromeRenderer::new(config.render, cleaner));
        let formatter = config
            .format_output
            .then(|| Formatter::new(Arc::clone(&model)));
        let agent = Agent::new(model, fetcher, renderer, config.agent);
        Ok(Self::new(agent, formatter))
    }

    pub async fn run(&self, query: &str) -> ScrapeOutcome {
        let report = self.agent.run(query).await;
        let raw = match report.outcome {
            Ok(raw) => raw,
            Err(error) => {
                return ScrapeOutcome::Failed {
                    error: error.to_string(),
                };
            }
        };

        let Some(formatter) = &self.formatter else {
            return ScrapeOutcome::Answer {
                raw_data: raw,
                formatted: None,
                format_error: None,
            };
        };

        match formatter.format(query, &raw).await {
            Ok(formatted) => ScrapeOutcome::Answer {
                raw_data: raw,
                formatted: Some(formatted),
                format_error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "formatting pass failed, keeping raw answer");
                ScrapeOutcome::Answer {
                    raw_data: raw,
                    formatted: None,
                    format_error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_json_shapes() {
        let ok = ScrapeOutcome::Answer {
            raw_data: "Paris".into(),
            formatted: Some("🇫🇷 **Paris**".into()),
            format_error: None,
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"raw_data": "Paris", "formatted": "🇫🇷 **Paris**"})
        );

        let failed = ScrapeOutcome::Failed {
            error: "MAX_STEPS_REACHED: x".into(),
        };
        assert!(!failed.is_success());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": "MAX_STEPS_REACHED: x"})
        );
    }
}
