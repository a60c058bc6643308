use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chapterwatch::app::AppContext;
use chapterwatch::cli::{commands, Cli, Commands};
use chapterwatch::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Add {
            id,
            title,
            url,
            scan,
            check_hours,
        } => {
            commands::add_series(&ctx, &id, &title, &url, &scan, &check_hours)?;
        }
        Commands::Remove { id } => {
            commands::remove_series(&ctx, &id)?;
        }
        Commands::List => {
            commands::list_series(&ctx)?;
        }
        Commands::Latest { id } => {
            commands::latest_chapter(&ctx, &id).await?;
        }
        Commands::Next => {
            commands::next_checks(&ctx)?;
        }
        Commands::Start => {
            commands::start(&ctx).await?;
        }
    }

    Ok(())
}
