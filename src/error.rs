//! Error taxonomy for every layer the agent talks to.
//!
//! Adapter errors (fetch, render, extraction) are recovered into the
//! conversation as text the model can react to. `ModelError` and the
//! `AgentError` variants end a run.

use thiserror::Error;

/// Static retrieval failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("could not read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// Failures worth another attempt when a retry budget is configured.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Body { .. } => false,
        }
    }
}

/// Headless browser failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("selector `{selector}` did not appear within {secs}s: {message}")]
    WaitTimeout {
        selector: String,
        secs: u64,
        message: String,
    },

    #[error("could not read rendered page: {0}")]
    Content(String),

    #[error("render task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// The call to the language-model endpoint itself failed.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("response missing choices[0].message.content")]
    MissingContent,
}

/// Terminal failure of an agent run.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("AGENT_ERROR: {0}")]
    Transport(#[from] ModelError),

    #[error("ERROR: Invalid action requested ({0})")]
    InvalidAction(String),

    #[error("MAX_STEPS_REACHED: Processing limit exceeded after {max_steps} steps")]
    StepBudgetExceeded { max_steps: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_errors_carry_classified_prefixes() {
        let transport = AgentError::from(ModelError::Api {
            status: 401,
            message: "bad key".into(),
        });
        assert!(transport.to_string().starts_with("AGENT_ERROR: "));
        assert!(transport.to_string().contains("401"));

        let invalid = AgentError::InvalidAction("no JSON object found".into());
        assert!(invalid.to_string().starts_with("ERROR: Invalid action requested"));

        let budget = AgentError::StepBudgetExceeded { max_steps: 5 };
        assert!(budget.to_string().starts_with("MAX_STEPS_REACHED: "));
        assert!(budget.to_string().contains('5'));
    }

    #[test]
    fn transient_fetch_errors() {
        let timeout = FetchError::Timeout {
            url: "http://a.test".into(),
            secs: 15,
        };
        assert!(timeout.is_transient());
        assert!(
            FetchError::Status {
                url: "http://a.test".into(),
                status: 503
            }
            .is_transient()
        );
        assert!(
            !FetchError::Status {
                url: "http://a.test".into(),
                status: 404
            }
            .is_transient()
        );
    }

    #[test]
    fn render_wait_timeout_names_selector() {
        let err = RenderError::WaitTimeout {
            selector: "#feed".into(),
            secs: 10,
            message: "timeout".into(),
        };
        assert!(err.to_string().contains("#feed"));
        assert!(err.to_string().contains("10s"));
    }
}
