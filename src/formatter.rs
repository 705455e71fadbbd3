use std::sync::Arc;

use crate::brain::{ChatModel, Sampling};
use crate::error::ModelError;
use crate::prompt::{FORMATTER_SYSTEM_PROMPT, formatter_request};
use crate::types::ChatMessage;

/// Second model pass that restyles a raw answer for humans.
pub struct Formatter {
    model: Arc<dyn ChatModel>,
    sampling: Sampling,
}

impl Formatter {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            sampling: Sampling::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub async fn format(&self, query: &str, raw: &str) -> Result<String, ModelError> {
        let messages = [
            ChatMessage::system(FORMATTER_SYSTEM_PROMPT),
            ChatMessage::user(formatter_request(query, raw)),
        ];
        self.model.complete(&messages, self.sampling).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::types::Role;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(Vec<ChatMessage>, Sampling)>>,
    }

    #[async_trait]
    impl ChatModel for Recorder {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            sampling: Sampling,
        ) -> Result<String, ModelError> {
            self.seen.lock().unwrap().push((messages.to_vec(), sampling));
            Ok("## Pretty".to_string())
        }
    }

    #[tokio::test]
    async fn sends_formatter_prompt_with_query_and_raw_data() {
        let model = Arc::new(Recorder::default());
        let sampling = Sampling {
            temperature: Some(0.7),
            max_tokens: None,
        };
        let formatter = Formatter::new(model.clone()).with_sampling(sampling);

        let out = formatter.format("btc price", "[\"$61,432.50\"]").await.unwrap();
        assert_eq!(out, "## Pretty");

        let seen = model.seen.lock().unwrap();
        let (messages, used) = &seen[0];
        assert_eq!(*used, sampling);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, FORMATTER_SYSTEM_PROMPT);
        assert!(messages[1].content.contains("btc price"));
        assert!(messages[1].content.contains("$61,432.50"));
    }
}
