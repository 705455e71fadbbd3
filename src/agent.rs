//! The bounded decide/act loop.
//!
//! Each step asks the model for one action, executes it, and appends the
//! result to the conversation. Large payloads go into a per-run
//! [`ContentStore`]; the model only ever sees a `FETCHED:<ref>|<url>` token
//! and asks for extractions against that ref.
//!
//! Adapter failures are fed back to the model as text. A model transport
//! failure or an undecodable reply ends the run immediately. There is no
//! retry at this level: the model's next action is the only recovery.

use std::sync::Arc;

use crate::brain::{ChatModel, Sampling};
use crate::codec;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::extract::extract;
use crate::fetch::Fetcher;
use crate::hands::Renderer;
use crate::prompt::AGENT_SYSTEM_PROMPT;
use crate::store::{ContentKind, ContentStore, ContentToken};
use crate::types::{Action, ChatMessage, Conversation};

pub const CONTENT_NOT_FOUND: &str = "CONTENT_NOT_FOUND";

#[derive(Debug)]
pub enum LoopState {
    Running(usize),
    Responded(String),
    Errored(AgentError),
}

/// Outcome of a single iteration.
#[derive(Debug)]
pub enum StepResult {
    Continue(ChatMessage),
    Answer(String),
    Failed(AgentError),
}

/// What a finished run hands back.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: Result<String, AgentError>,
    /// Model calls made, including the one that ended the run.
    pub steps: usize,
    pub transcript: Vec<ChatMessage>,
}

pub struct Agent {
    model: Arc<dyn ChatModel>,
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        fetcher: Arc<dyn Fetcher>,
        renderer: Arc<dyn Renderer>,
        config: AgentConfig,
    ) -> Self {
        Self {
            model,
            fetcher,
            renderer,
            config,
        }
    }

    pub async fn run(&self, query: &str) -> RunReport {
        let max_steps = self.config.max_steps;
        let mut conversation = Conversation::seeded(AGENT_SYSTEM_PROMPT, query);
        let mut store = ContentStore::new();
        let mut taken = 0;

        tracing::info!(max_steps, "starting agent run");

        let mut state = LoopState::Running(0);
        let outcome = loop {
            state = match state {
                LoopState::Responded(content) => break Ok(content),
                LoopState::Errored(error) => break Err(error),
                LoopState::Running(steps) if steps >= max_steps => {
                    tracing::warn!(max_steps, "step limit reached");
                    LoopState::Errored(AgentError::StepBudgetExceeded { max_steps })
                }
                LoopState::Running(steps) => {
                    let step = steps + 1;
                    taken = step;
                    match self.step(step, &conversation, &mut store).await {
                        StepResult::Continue(message) => {
                            conversation.push(message);
                            LoopState::Running(step)
                        }
                        StepResult::Answer(content) => LoopState::Responded(content),
                        StepResult::Failed(error) => LoopState::Errored(error),
                    }
                }
            };
        };

        match &outcome {
            Ok(answer) => tracing::info!(steps = taken, answer_len = answer.len(), "agent responded"),
            Err(error) => tracing::warn!(steps = taken, %error, "agent run failed"),
        }

        RunReport {
            outcome,
            steps: taken,
            transcript: conversation.into_messages(),
        }
    }

    async fn step(
        &self,
        step: usize,
        conversation: &Conversation,
        store: &mut ContentStore,
    ) -> StepResult {
        let reply = match self
            .model
            .complete(conversation.messages(), Sampling::default())
            .await
        {
            Ok(reply) => reply,
            Err(e) => return StepResult::Failed(AgentError::Transport(e)),
        };

        let action = codec::decode(&reply);
        tracing::info!(
            step,
            action = action.kind(),
            messages = conversation.len(),
            stored = store.len(),
            "model chose action"
        );

        match action {
            Action::Respond { content } => StepResult::Answer(content),
            Action::Fetch { url } => {
                let message = match self.fetcher.fetch(&url).await {
                    Ok(text) => {
                        let content_ref = store.put(text);
                        tracing::debug!(%url, %content_ref, "stored fetched content");
                        ContentToken::new(ContentKind::Fetched, content_ref, url).to_string()
                    }
                    Err(e) => format!("FETCH_ERROR: {e}"),
                };
                StepResult::Continue(ChatMessage::assistant(message))
            }
            Action::Render { url, wait_for } => {
                let message = match self.renderer.render(&url, wait_for.as_deref()).await {
                    Ok(text) => {
                        let content_ref = store.put(text);
                        tracing::debug!(%url, %content_ref, "stored rendered content");
                        ContentToken::new(ContentKind::Rendered, content_ref, url).to_string()
                    }
                    Err(e) => format!("RENDER_ERROR: {e}"),
                };
                StepResult::Continue(ChatMessage::assistant(message))
            }
            Action::Extract {
                content_ref,
                selector,
            } => {
                let content_ref = content_ref.normalized();
                let results = match store.get(&content_ref) {
                    None => {
                        tracing::warn!(%content_ref, "extract against unknown content ref");
                        vec![CONTENT_NOT_FOUND.to_string()]
                    }
                    Some(payload) => match extract(payload, &selector) {
                        Ok(matches) => matches,
                        Err(e) => vec![format!("EXTRACTION_ERROR: {e}")],
                    },
                };
                tracing::debug!(%content_ref, %selector, matches = results.len(), "extracted");
                let encoded = serde_json::to_string(&results).unwrap_or_else(|_| "[]".to_string());
                StepResult::Continue(ChatMessage::assistant(format!("EXTRACTED:{encoded}")))
            }
            Action::Invalid { reason } => {
                tracing::warn!(step, %reason, reply = %reply, "undecodable model reply");
                StepResult::Failed(AgentError::InvalidAction(reason))
            }
        }
    }
}
