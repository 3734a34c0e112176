//! Timer-driven session driver
//!
//! One tokio task owns the [`Session`]. It serializes ticks and intents,
//! so ticks never overlap, and publishes a fresh [`SessionView`] on a watch
//! channel after every change.

use crate::error::KernelError;
use crate::session::{Intent, Session, SessionView};
use rand::RngCore;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Capacity of the intent queue
pub const COMMAND_BUFFER: usize = 64;

/// Messages sent to the driver task
#[derive(Debug, Clone)]
pub enum Command {
    /// Apply a user intent
    Intent(Intent),
    /// Stop the loop and hand back the session
    Shutdown,
}

/// Handle to a running driver
#[derive(Debug)]
pub struct DriverHandle {
    commands: mpsc::Sender<Command>,
    views: watch::Receiver<SessionView>,
    task: JoinHandle<Session>,
}

impl DriverHandle {
    /// Queue an intent
    pub async fn send(&self, intent: Intent) -> Result<(), KernelError> {
        self.commands
            .send(Command::Intent(intent))
            .await
            .map_err(|_| KernelError::DriverClosed)
    }

    /// Receiver for published views
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.views.clone()
    }

    /// Latest published view
    #[must_use]
    pub fn current(&self) -> SessionView {
        self.views.borrow().clone()
    }

    /// Stop the driver and return the final session
    pub async fn shutdown(self) -> Result<Session, KernelError> {
        // A closed channel means the loop already ended; the join still yields the session.
        let _ = self.commands.send(Command::Shutdown).await;
        Ok(self.task.await?)
    }
}

/// Start driving `session` on the current tokio runtime.
///
/// Ticks fire every `tick_interval_ms` while the session is playing.
/// Missed ticks are delayed rather than bursted.
pub fn spawn<R>(session: Session, rng: R) -> DriverHandle
where
    R: RngCore + Send + 'static,
{
    let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
    let (views_tx, views) = watch::channel(session.view());
    let task = tokio::spawn(drive(session, rng, rx, views_tx));

    DriverHandle {
        commands,
        views,
        task,
    }
}

/// Driver loop (runs in its own tokio task)
async fn drive<R: RngCore>(
    mut session: Session,
    mut rng: R,
    mut commands: mpsc::Receiver<Command>,
    views: watch::Sender<SessionView>,
) -> Session {
    let mut interval = time::interval(session.config().tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Command::Intent(intent)) => {
                    if session.apply(intent, &mut rng) {
                        views.send_replace(session.view());
                    }
                }
                Some(Command::Shutdown) | None => break,
            },
            _ = interval.tick() => {
                if !session.is_playing() {
                    continue;
                }
                let report = session.tick(&mut rng);
                tracing::info!(
                    tick = report.tick,
                    advanced = report.advanced.len(),
                    pruned = report.pruned.len(),
                    spawned = report.spawned.is_some(),
                    total = session.records().len(),
                    "tick complete"
                );
                views.send_replace(session.view());
            }
        }
    }

    tracing::info!(ticks = session.ticks(), "driver stopped");
    session
}
