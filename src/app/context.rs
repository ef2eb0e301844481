use std::path::Path;

use crate::app::error::{NotecrawlError, Result};
use crate::config::Config;
use crate::scraper::{ChromeConnector, ChromePage, ChromeSession, NoteCrawler, ScraperConfig};

pub struct AppContext {
    pub config: Config,
}

impl AppContext {
    /// Load configuration, applying a command-line port override
    pub fn new(config_path: Option<&Path>, port: Option<u16>) -> Result<Self> {
        let mut config =
            Config::load(config_path).map_err(|e| NotecrawlError::Config(e.to_string()))?;
        if let Some(port) = port {
            config.scraper.debug_port = port;
        }
        Ok(Self { config })
    }

    pub fn scraper_config(&self) -> &ScraperConfig {
        &self.config.scraper
    }

    pub fn connector(&self) -> Result<ChromeConnector> {
        ChromeConnector::new(self.scraper_config())
    }

    /// Attach to the browser and open a crawler on a fresh blank tab
    pub async fn open_crawler(&self) -> Result<(ChromeSession, NoteCrawler<ChromePage>)> {
        let config = self.scraper_config().clone();
        let session = self.connector()?.connect().await?;

        let page = match session.new_page("about:blank", config.poll_interval()).await {
            Ok(page) => page,
            Err(e) => {
                session.detach().await;
                return Err(e);
            }
        };

        Ok((session, NoteCrawler::new(page, config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_port_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scraper]\ndebug_port = 9333\n").unwrap();

        let ctx = AppContext::new(Some(path.as_path()), None).unwrap();
        assert_eq!(ctx.scraper_config().debug_port, 9333);

        let ctx = AppContext::new(Some(path.as_path()), Some(9444)).unwrap();
        assert_eq!(ctx.scraper_config().debug_port, 9444);
    }

    #[test]
    fn test_bad_config_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();

        let result = AppContext::new(Some(path.as_path()), None);
        assert!(matches!(result, Err(NotecrawlError::Config(_))));
    }
}
