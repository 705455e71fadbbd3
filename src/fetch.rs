use async_trait::async_trait;
use reqwest::Client;

use crate::config::FetchConfig;
use crate::dom::Cleaner;
use crate::error::FetchError;

/// Static page retrieval. Implementations return cleaned page text.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET with a fixed timeout.
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
    cleaner: Cleaner,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig, cleaner: Cleaner) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            config,
            cleaner,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.classify(url, e)
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn classify(&self, url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: self.config.timeout.as_secs(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(html) => {
                    let text = self.cleaner.clean(&html);
                    tracing::debug!(url, raw_len = html.len(), text_len = text.len(), "fetched page");
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt < self.config.retries => {
                    attempt += 1;
                    tracing::warn!(url, attempt, error = %e, "fetch failed, retrying");
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, "fetch failed");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(config: FetchConfig) -> HttpFetcher {
        HttpFetcher::new(config, Cleaner::default()).unwrap()
    }

    #[tokio::test]
    async fn returns_cleaned_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><head><script>track()</script></head><body><nav>menu</nav><h1>Hello</h1></body></html>",
            ))
            .mount(&server)
            .await;

        let text = fetcher(FetchConfig::default())
            .fetch(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn error_status_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher(FetchConfig::default())
            .fetch(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = FetchConfig {
            timeout: Duration::from_millis(200),
            ..FetchConfig::default()
        };
        let err = fetcher(config)
            .fetch(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let err = fetcher(FetchConfig::default())
            .fetch("http://127.0.0.1:1/")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn retries_transient_failures_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>second try</p>"))
            .mount(&server)
            .await;

        let config = FetchConfig {
            retries: 1,
            retry_backoff: Duration::from_millis(10),
            ..FetchConfig::default()
        };
        let text = fetcher(config).fetch(&server.uri()).await.unwrap();
        assert_eq!(text, "second try");
    }

    #[tokio::test]
    async fn no_retry_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher(FetchConfig::default())
            .fetch(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }
}
