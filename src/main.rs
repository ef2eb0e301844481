use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use notecrawl::app::AppContext;
use notecrawl::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `note` can print JSON on stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.config.as_deref(), cli.port)?;

    match cli.command {
        Commands::Search {
            keyword,
            output,
            max_results,
            append,
        } => {
            commands::search_notes(&ctx, &keyword, output.as_deref(), max_results, append).await?;
        }
        Commands::Note { url, output } => {
            commands::scrape_note(&ctx, &url, output.as_deref()).await?;
        }
        Commands::Check => {
            commands::check_browser(&ctx).await?;
        }
    }

    Ok(())
}
