use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::{NotecrawlError, Result};
use crate::scraper::config::ScraperConfig;
use crate::scraper::scripts::PageScripts;
use crate::scraper::BrowserPage;

const TCP_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Response of the debug endpoint's `/json/version`
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,

    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: Option<String>,

    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

/// Attaches to a browser that is already running with a remote debugging port
pub struct ChromeConnector {
    host: String,
    port: u16,
    client: Client,
    stealth_script: Option<PathBuf>,
}

impl ChromeConnector {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        // The endpoint is local; never route it through a proxy
        let client = Client::builder()
            .timeout(config.probe_timeout())
            .no_proxy()
            .build()?;

        Ok(Self {
            host: config.debug_host.clone(),
            port: config.debug_port,
            client,
            stealth_script: config.stealth_script.clone(),
        })
    }

    /// Verify the port is open and serves a browser debug endpoint
    pub async fn check_endpoint(&self) -> Result<BrowserVersion> {
        let addr = format!("{}:{}", self.host, self.port);
        info!("Checking for a browser on {}", addr);

        match tokio::time::timeout(TCP_PROBE_TIMEOUT, TcpStream::connect(&addr)).await {
            Ok(Ok(_)) => debug!("Port {} is accepting connections", self.port),
            Ok(Err(e)) => {
                debug!("Connect to {} failed: {}", addr, e);
                return Err(NotecrawlError::BrowserNotRunning { port: self.port });
            }
            Err(_) => return Err(NotecrawlError::BrowserNotRunning { port: self.port }),
        }

        let not_debug_endpoint = |reason: String| NotecrawlError::NotDebugEndpoint {
            port: self.port,
            reason,
        };

        let response = self
            .client
            .get(format!("http://{}/json/version", addr))
            .send()
            .await
            .map_err(|e| not_debug_endpoint(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(not_debug_endpoint(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| not_debug_endpoint(e.to_string()))?;
        let version: BrowserVersion = serde_json::from_slice(&body)
            .map_err(|e| not_debug_endpoint(format!("unexpected response: {}", e)))?;

        info!("Found browser: {}", version.browser);
        Ok(version)
    }

    /// Check the endpoint, then attach over the CDP websocket
    pub async fn connect(&self) -> Result<ChromeSession> {
        let version = self.check_endpoint().await?;
        debug!("Debugger URL: {}", version.web_socket_debugger_url);

        let (browser, mut handler) = Browser::connect(version.web_socket_debugger_url.clone())
            .await
            .map_err(|e| NotecrawlError::Scraper(format!("Failed to attach to browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        info!("Attached to {}", version.browser);
        Ok(ChromeSession {
            browser,
            handler,
            version,
            stealth_script: self.stealth_script.clone(),
        })
    }
}

/// A live attachment to the operator's browser
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    version: BrowserVersion,
    stealth_script: Option<PathBuf>,
}

impl ChromeSession {
    /// The browser reported by the debug endpoint when attaching
    pub fn version(&self) -> &BrowserVersion {
        &self.version
    }

    /// Open a new tab at `url`, installing the stealth script first if one is configured
    pub async fn new_page(&self, url: &str, poll_interval: Duration) -> Result<ChromePage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| NotecrawlError::Scraper(format!("Failed to create page: {}", e)))?;

        if let Some(path) = &self.stealth_script {
            install_stealth_script(&page, path).await;
        }

        if url != "about:blank" {
            page.goto(url)
                .await
                .map_err(|e| NotecrawlError::Scraper(format!("Navigation to {} failed: {}", url, e)))?;
        }

        Ok(ChromePage {
            page,
            poll_interval,
        })
    }

    /// Drop the connection without closing the browser itself
    pub async fn detach(self) {
        let ChromeSession {
            browser, handler, ..
        } = self;

        handler.abort();
        if let Err(e) = handler.await {
            if !e.is_cancelled() {
                warn!("Browser handler ended abnormally: {}", e);
            }
        }
        drop(browser);

        info!("Detached from browser (it is still running)");
    }
}

/// Read a stealth script from disk. A missing or unreadable file is logged and skipped.
async fn read_stealth_script(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(source) if !source.trim().is_empty() => Some(source),
        Ok(_) => {
            warn!("Stealth script {} is empty, skipping", path.display());
            None
        }
        Err(e) => {
            warn!("Failed to read stealth script {}: {}", path.display(), e);
            None
        }
    }
}

async fn install_stealth_script(page: &Page, path: &Path) {
    let Some(source) = read_stealth_script(path).await else {
        return;
    };

    match page
        .evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(source))
        .await
    {
        Ok(_) => info!("Installed stealth script {}", path.display()),
        Err(e) => warn!("Failed to install stealth script {}: {}", path.display(), e),
    }
}

/// One browser tab driven over CDP
pub struct ChromePage {
    page: Page,
    poll_interval: Duration,
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| NotecrawlError::Scraper(format!("Navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        let poll = async {
            while self.page.find_element(selector).await.is_err() {
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| NotecrawlError::Timeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let visible = self.evaluate(&PageScripts::visibility(selector)).await?;
        Ok(visible.as_bool().unwrap_or(false))
    }

    async fn scroll_by(&self, selector: &str, delta_px: i64) -> Result<()> {
        let scrolled = self
            .evaluate(&PageScripts::scroll_by(selector, delta_px))
            .await?;
        if scrolled.as_bool() != Some(true) {
            return Err(NotecrawlError::Scraper(format!(
                "Scroll container not found: {}",
                selector
            )));
        }
        Ok(())
    }

    async fn submit_text(&self, selector: &str, text: &str) -> Result<()> {
        let input = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| NotecrawlError::Scraper(format!("Input {} not found: {}", selector, e)))?;

        self.evaluate(&PageScripts::clear_input(selector)).await?;

        input
            .click()
            .await
            .map_err(|e| NotecrawlError::Scraper(format!("Failed to focus {}: {}", selector, e)))?
            .type_str(text)
            .await
            .map_err(|e| NotecrawlError::Scraper(format!("Failed to type into {}: {}", selector, e)))?
            .press_key("Enter")
            .await
            .map_err(|e| NotecrawlError::Scraper(format!("Failed to submit {}: {}", selector, e)))?;

        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.page
            .evaluate(script.to_string())
            .await
            .map_err(|e| NotecrawlError::Scraper(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| NotecrawlError::Scraper(format!("Failed to parse result: {:?}", e)))
    }

    async fn close(&self) -> Result<()> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| NotecrawlError::Scraper(format!("Failed to close page: {}", e)))
    }
}
