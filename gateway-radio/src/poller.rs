//! Periodic refresh of the player state

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::player::RadioPlayer;
use crate::state::PlaybackState;

/// Spawns the background task that calls [`RadioPlayer::update`] on an interval
pub struct Poller;

impl Poller {
    /// Start polling. The first refresh happens immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(player: Arc<RadioPlayer>, interval: Duration) -> PollerHandle {
        let (state_tx, state_rx) = watch::channel(player.state());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let outcome = player.update().await;
                        state_tx.send_replace(outcome.state);
                    }
                }
            }

            tracing::debug!("Stopped polling {}", player.name());
        });

        tracing::debug!("Polling every {:?}", interval);
        PollerHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
            state: state_rx,
        }
    }
}

/// Handle to a running poller
///
/// Dropping the handle stops the poller without waiting for it.
pub struct PollerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    state: watch::Receiver<PlaybackState>,
}

impl PollerHandle {
    /// Receiver that sees the state after every refresh
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    /// Latest published state
    pub fn latest(&self) -> PlaybackState {
        *self.state.borrow()
    }

    /// Stop polling and wait for an in-flight refresh to finish
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Poller task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
