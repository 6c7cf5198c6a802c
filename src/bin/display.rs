//! Terminal display session driving the sync engine against a running
//! leaderboard server.
//!
//! Fetches the initial snapshot over HTTP, subscribes to the SSE push feed,
//! and reprints the ranked list every time the published view changes. When
//! the push channel fails, the session visibly degrades to polling.

use std::env;

use anyhow::Context;
use reqwest::Client;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leaderboard_back::sync::{
    ConnectionState, FallbackPoller, HttpSnapshotFetcher, POLL_INTERVAL, SseChangeChannel,
    SyncController, TeamRecord, TeamStatus,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let base_url = env::args()
        .nth(1)
        .or_else(|| env::var("LEADERBOARD_URL").ok())
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    let client = Client::builder()
        .build()
        .context("building HTTP client")?;

    let fetcher = HttpSnapshotFetcher::new(client.clone(), &base_url);
    let channel = SseChangeChannel::new(client, &base_url);
    let (poller, ticks) = FallbackPoller::new(POLL_INTERVAL);

    let handle = SyncController::new(fetcher, channel, poller, ticks).spawn();
    let mut teams = handle.teams();
    let mut connection = handle.connection();

    println!("watching {base_url} (ctrl-c to quit)");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = teams.changed() => {
                if changed.is_err() {
                    break;
                }
                let ranked = teams.borrow().clone();
                render(&ranked, *connection.borrow());
            }
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *connection.borrow();
                println!("[connection: {state}]");
                if state == ConnectionState::Disconnected {
                    break;
                }
            }
        }
    }

    handle.shutdown().await;
    println!("session closed");
    Ok(())
}

fn render(teams: &[TeamRecord], connection: ConnectionState) {
    println!();
    println!("{:<4} {:<30} {:>8}  {}", "#", "team", "score", "status");
    for (rank, team) in teams.iter().enumerate() {
        println!(
            "{:<4} {:<30} {:>8}  {}",
            rank + 1,
            team.name,
            team.score,
            status_label(team.status)
        );
    }
    println!("({} teams, {connection})", teams.len());
}

fn status_label(status: TeamStatus) -> &'static str {
    match status {
        TeamStatus::Active => "active",
        TeamStatus::Inactive => "inactive",
        TeamStatus::Disqualified => "disqualified",
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
