use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::room::Room;

/// Spawn the background task that moves idle operators to away.
///
/// The task runs until the returned handle is aborted.
pub fn spawn_away_sweep(room: Arc<Room>, interval: Duration, threshold: Duration) -> JoinHandle<()> {
    info!("Away sweep every {:?}, inactivity threshold {:?}", interval, threshold);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let marked = room.sweep_idle(Utc::now(), threshold);
            if marked > 0 {
                debug!("Away sweep marked {} operator(s) away", marked);
            }
        }
    })
}
