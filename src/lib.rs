//! LLM-driven web scraping agent.
//!
//! A language model picks one action per step (fetch, render, extract or
//! respond); the [`Agent`] executes it and feeds the result back until the
//! model answers or the step budget runs out.

pub mod agent;
pub mod brain;
pub mod codec;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatter;
pub mod hands;
pub mod pipeline;
pub mod prompt;
pub mod store;
pub mod types;

pub use agent::{Agent, LoopState, RunReport, StepResult};
pub use brain::{Brain, ChatModel, Sampling};
pub use error::{AgentError, ExtractionError, FetchError, ModelError, RenderError};
pub use fetch::{Fetcher, HttpFetcher};
pub use formatter::Formatter;
pub use hands::{ChromeRenderer, Renderer};
pub use pipeline::{Pipeline, PipelineConfig, ScrapeOutcome};
pub use store::{ContentKind, ContentRef, ContentStore, ContentToken};
pub use types::{Action, ChatMessage, Conversation, Role};
