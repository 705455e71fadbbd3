use std::ffi::OsStr;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};

use crate::config::RenderConfig;
use crate::dom::Cleaner;
use crate::error::RenderError;

/// JavaScript-capable page retrieval. Implementations return cleaned text.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, wait_for: Option<&str>) -> Result<String, RenderError>;
}

/// Launches a fresh Chrome for every call and tears it down before
/// returning, so no cookies, tabs or processes leak between steps.
pub struct ChromeRenderer {
    config: RenderConfig,
    cleaner: Cleaner,
}

impl ChromeRenderer {
    pub fn new(config: RenderConfig, cleaner: Cleaner) -> Self {
        Self { config, cleaner }
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str, wait_for: Option<&str>) -> Result<String, RenderError> {
        let config = self.config.clone();
        let target = url.to_string();
        let selector = wait_for.map(str::to_string);

        // headless_chrome is blocking; keep it off the async workers.
        let html = tokio::task::spawn_blocking(move || {
            render_blocking(&config, &target, selector.as_deref())
        })
        .await
        .map_err(|e| RenderError::Aborted(e.to_string()))?
        .inspect_err(|e| tracing::warn!(url, error = %e, "render failed"))?;

        let text = self.cleaner.clean(&html);
        tracing::debug!(url, raw_len = html.len(), text_len = text.len(), "rendered page");
        Ok(text)
    }
}

fn launch_options(config: &RenderConfig) -> Result<LaunchOptions<'static>, RenderError> {
    LaunchOptions::default_builder()
        .headless(config.headless)
        .sandbox(config.sandbox)
        .path(config.chrome_path.clone())
        .idle_browser_timeout(config.navigation_timeout + config.wait_timeout + Duration::from_secs(30))
        .args(vec![
            OsStr::new("--no-first-run"),
            OsStr::new("--no-default-browser-check"),
            OsStr::new("--disable-blink-features=AutomationControlled"),
        ])
        .build()
        .map_err(|e| RenderError::Launch(e.to_string()))
}

fn render_blocking(
    config: &RenderConfig,
    url: &str,
    wait_for: Option<&str>,
) -> Result<String, RenderError> {
    let options = launch_options(config)?;
    tracing::debug!(url, headless = config.headless, "launching Chrome");
    let browser = Browser::new(options).map_err(|e| RenderError::Launch(format!("{e:#}")))?;
    let tab = browser
        .new_tab()
        .map_err(|e| RenderError::Launch(format!("{e:#}")))?;
    tab.set_default_timeout(config.navigation_timeout);

    tab.navigate_to(url)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            message: format!("{e:#}"),
        })?;

    if let Some(selector) = wait_for {
        tab.wait_for_element_with_custom_timeout(selector, config.wait_timeout)
            .map_err(|e| RenderError::WaitTimeout {
                selector: selector.to_string(),
                secs: config.wait_timeout.as_secs(),
                message: format!("{e:#}"),
            })?;
    }

    let html = tab
        .get_content()
        .map_err(|e| RenderError::Content(format!("{e:#}")))?;

    // Dropping the browser kills the Chrome process.
    drop(browser);
    Ok(html)
}
