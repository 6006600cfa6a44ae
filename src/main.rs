use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tracing::info;

use roomboard::api::RoomSummary;
use roomboard::config::Config;
use roomboard::directory::SnapshotDirectory;
use roomboard::history::history_across;
use roomboard::session::{Redirect, Session};
use roomboard::time::now_ms;
use roomboard::{filter_rooms_in, resolve_window, RefreshOutcome, RoomBoard};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = Config::from_env()?;
    roomboard::observability::init(config.metrics_port)?;

    info!("roomboard starting");
    info!("  snapshot: {}", config.snapshot.display());
    info!("  factory: {}", if config.factory.is_empty() { "<all>" } else { config.factory.as_str() });
    info!("  max_concurrent_fetches: {}", config.board.max_concurrent_fetches);

    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();
    let navigator = tokio::spawn(async move {
        while let Some(redirect) = nav_rx.recv().await {
            match redirect {
                Redirect::Login => info!("not signed in: booking history unavailable"),
                Redirect::Home => info!("returning to room list"),
            }
        }
    });

    let directory = SnapshotDirectory::load(&config.snapshot, *Local::now().offset())?;
    let board = RoomBoard::new(Arc::new(directory), config.board.clone());
    if let RefreshOutcome::Committed { failed, .. } = board.refresh(&config.factory, config.date).await? {
        if failed > 0 {
            tracing::warn!("{failed} room schedules could not be loaded; their status is unknown");
        }
    }

    let window = resolve_window(&config.filter);

    let rooms = board.snapshot().await;
    let views = filter_rooms_in(&rooms, &config.filter, &window.span);
    {
        let mut out = std::io::stdout().lock();
        for view in &views {
            serde_json::to_writer(&mut out, &RoomSummary::from(*view))?;
            writeln!(out)?;
        }
    }
    info!("{} of {} rooms match", views.len(), rooms.len());

    let mut session = Session::new(config.session_file.clone(), Some(nav_tx));
    let now = now_ms();
    session.load(now)?;
    if let Ok(auth) = session.require(now) {
        let history = history_across(&auth.user_info.user_id, &rooms, now);
        info!(
            "signed in as {}: {} upcoming, {} past, {} cancelled bookings",
            auth.user_info.display_name,
            history.upcoming.len(),
            history.past.len(),
            history.cancelled.len()
        );
    }

    drop(session);
    navigator.await?;
    info!("roomboard done");
    Ok(())
}
