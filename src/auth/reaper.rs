// Background compaction of expired sessions

use crate::auth::repository::SessionStore;
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Delete sessions whose refresh token has already expired
pub async fn reap_expired_sessions(sessions: &dyn SessionStore) -> u64 {
    match sessions.delete_expired(Utc::now()).await {
        Ok(0) => {
            debug!("Session reaper: nothing to delete");
            0
        }
        Ok(deleted) => {
            info!("Session reaper deleted {} expired sessions", deleted);
            deleted
        }
        Err(e) => {
            error!("Session reaper failed: {}", e);
            0
        }
    }
}

/// Spawn the periodic reaper
///
/// The first sweep runs immediately; errors are logged and the loop keeps going.
pub fn spawn_session_reaper(sessions: Arc<dyn SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            reap_expired_sessions(sessions.as_ref()).await;
        }
    })
}
