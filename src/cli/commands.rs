use std::path::Path;

use crate::app::{AppContext, Result};
use crate::cli::default_output_path;
use crate::scraper::CrawlSummary;
use crate::store::{JsonlStore, Store};

/// Verify the debug endpoint and report the browser behind it
pub async fn check_browser(ctx: &AppContext) -> Result<()> {
    let version = ctx.connector()?.check_endpoint().await?;

    println!("Browser: {}", version.browser);
    if let Some(protocol) = version.protocol_version {
        println!("Protocol: {}", protocol);
    }
    println!("Debugger: {}", version.web_socket_debugger_url);
    Ok(())
}

/// Search a keyword and write one record per result
pub async fn search_notes(
    ctx: &AppContext,
    keyword: &str,
    output: Option<&Path>,
    max_results: usize,
    append: bool,
) -> Result<()> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(keyword));

    // The output file is only opened once the browser is attached
    let (session, crawler) = ctx.open_crawler().await?;
    println!("Attached to {}", session.version().browser);

    let result: Result<CrawlSummary> = async {
        let store = if append {
            JsonlStore::append_to(&path)?
        } else {
            JsonlStore::create(&path)?
        };
        crawler.start().await?;
        crawler.crawl(keyword, max_results, &store).await
    }
    .await;

    crawler.close().await;
    session.detach().await;

    let summary = result?;
    println!(
        "Crawl complete: {} found, {} saved, {} failed",
        summary.found, summary.saved, summary.failed
    );
    println!("Output: {}", path.display());
    Ok(())
}

/// Scrape one detail page, printing the record or appending it to `output`
pub async fn scrape_note(ctx: &AppContext, url: &str, output: Option<&Path>) -> Result<()> {
    let (session, crawler) = ctx.open_crawler().await?;

    let result = crawler.catch_note(url).await;

    crawler.close().await;
    session.detach().await;

    let record = result?;
    match output {
        Some(path) => {
            JsonlStore::append_to(path)?.append(&record)?;
            println!("Saved note {} to {}", record.id, path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&record)?),
    }
    Ok(())
}
