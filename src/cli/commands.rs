use chrono::Local;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::app::{AppContext, Result, WatchError};
use crate::domain::Series;
use crate::schedule;
use crate::watcher::WatcherSupervisor;

pub fn add_series(
    ctx: &AppContext,
    id: &str,
    title: &str,
    url: &str,
    scan: &str,
    check_hours: &str,
) -> Result<()> {
    url::Url::parse(url)?;
    let scan = scan.parse()?;
    let hours = Series::parse_check_hours(check_hours)?;
    let series = Series::new(id.to_string(), title.to_string(), url.to_string(), scan, hours)?;

    ctx.store.add_series(&series)?;
    println!(
        "Registered series: {} ({}) at hours [{}]",
        series.id,
        series.title,
        series.check_hours_string()
    );
    Ok(())
}

pub fn remove_series(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.store
        .get_series(id)?
        .ok_or_else(|| WatchError::SeriesNotFound(id.to_string()))?;

    ctx.store.remove_series(id)?;
    println!("Removed series: {id}");
    Ok(())
}

pub fn list_series(ctx: &AppContext) -> Result<()> {
    let series = ctx.store.get_all_series()?;

    if series.is_empty() {
        println!("No series registered");
        return Ok(());
    }

    for s in series {
        println!(
            "{} - {} [{}] at hours [{}]\n  {}",
            s.id,
            s.title,
            s.scan,
            s.check_hours_string(),
            s.url
        );
    }

    Ok(())
}

/// Fetch and print the latest chapter without touching detection state.
pub async fn latest_chapter(ctx: &AppContext, id: &str) -> Result<()> {
    let series = ctx
        .store
        .get_series(id)?
        .ok_or_else(|| WatchError::SeriesNotFound(id.to_string()))?;

    let chapter = ctx.fetcher.fetch_last_chapter(&series).await?;
    println!(
        "[ {} ] Last Chapter Available => [{}]\n{}\n{}",
        series.title, chapter.number, chapter.description, chapter.url
    );
    Ok(())
}

pub fn next_checks(ctx: &AppContext) -> Result<()> {
    let series = ctx.store.get_all_series()?;

    if series.is_empty() {
        println!("No series registered");
        return Ok(());
    }

    let now = Local::now();
    for s in series {
        let at = schedule::next_check_time(&s.check_hours, now);
        let until = at - now;
        println!(
            "[ {} ] Next checking at {} (in {}h{:02}m)",
            s.title,
            at.format("%Y-%m-%d %H:%M"),
            until.num_hours(),
            until.num_minutes() % 60
        );
    }

    Ok(())
}

/// Run the supervisor until SIGTERM/SIGINT.
pub async fn start(ctx: &AppContext) -> Result<()> {
    info!("Starting chapterwatch service");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_signal_listener(shutdown_tx);

    let supervisor = WatcherSupervisor::new(
        ctx.store.clone(),
        ctx.fetcher.clone(),
        ctx.notifier.clone(),
        ctx.config.retry_backoff(),
    );
    supervisor.run(shutdown_rx).await?;

    info!("chapterwatch service is down");
    Ok(())
}

fn spawn_signal_listener(shutdown: watch::Sender<bool>) {
    #[cfg(unix)]
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to set up SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to set up SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
        warn!("Shutdown signal received");
        let _ = shutdown.send(true);
    });

    #[cfg(windows)]
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        warn!("Shutdown signal received");
        let _ = shutdown.send(true);
    });
}
