//! Startup and maintenance tasks shared by the server and the CLI.

use crate::{state::AppState, Result};
use sqlx::PgPool;
use std::time::Duration;

pub async fn run_migrations(db_pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(db_pool)
        .await
        .map_err(|e| crate::Error::Internal(format!("Migration failed: {}", e)))?;
    Ok(())
}

/// Periodically delete expired session rows. Runs until the runtime shuts down.
pub fn spawn_session_sweeper(state: AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match state.sessions.purge_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(purged = n, "Expired sessions removed"),
                Err(e) => tracing::warn!(error = %e, "Session sweep failed"),
            }
        }
    })
}
