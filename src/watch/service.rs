use std::time::Duration;

use notify::Event;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::sink::EventSink;
use super::subscriptions::SubscriptionTable;
use crate::dirs::DirectoryPath;
use crate::error::{RandPathError, Result};

/// Lifecycle of the watcher task. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WatchState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Background notifier for create/delete/rename activity.
///
/// Watches the directories it was built with. Later changes to the
/// directory list are not picked up until a new service is started.
pub struct WatchService<S> {
    snapshot: Vec<DirectoryPath>,
    sink: S,
    cancel: CancellationToken,
    state: watch::Sender<WatchState>,
}

impl<S: EventSink> WatchService<S> {
    pub fn new(snapshot: Vec<DirectoryPath>, sink: S, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(WatchState::Starting);
        Self {
            snapshot,
            sink,
            cancel,
            state,
        }
    }

    pub fn subscribe_state(&self) -> watch::Receiver<WatchState> {
        self.state.subscribe()
    }

    /// Run on the current tokio runtime.
    pub fn spawn(self) -> WatchHandle {
        let state = self.state.subscribe();
        let cancel = self.cancel.clone();
        let join = tokio::spawn(self.run());
        WatchHandle {
            join,
            state,
            cancel,
        }
    }

    /// Watch until cancelled or until the event channel fails.
    ///
    /// Always ends in [`WatchState::Stopped`] with every subscription released.
    pub async fn run(self) -> Result<()> {
        let Self {
            snapshot,
            mut sink,
            cancel,
            state,
        } = self;

        let outcome = watch_loop(&snapshot, &mut sink, &cancel, &state).await;
        state.send_replace(WatchState::Stopped);

        match &outcome {
            Ok(()) => tracing::info!("Watcher stopped"),
            Err(err) => tracing::error!("[Watcher] {}", err),
        }
        outcome
    }
}

async fn watch_loop<S: EventSink>(
    snapshot: &[DirectoryPath],
    sink: &mut S,
    cancel: &CancellationToken,
    state: &watch::Sender<WatchState>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    // Bridge notify's callback thread into tokio
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })?;

    let mut table = SubscriptionTable::register(&mut watcher, snapshot);
    if table.is_empty() {
        tracing::warn!("[Watcher] No valid directories to watch. Exiting.");
        return Ok(());
    }

    state.send_replace(WatchState::Running);
    tracing::info!("Watching {} directories", table.len());

    let outcome = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break Ok(()),
            received = rx.recv() => match received {
                Some(Ok(event)) => {
                    for decoded in table.decode(&event) {
                        sink.emit(&decoded);
                    }
                }
                Some(Err(err)) if is_fatal(&err) => {
                    break Err(RandPathError::FatalWatch(format!("read error: {err}")));
                }
                Some(Err(err)) => {
                    tracing::warn!("File watcher error: {}", err);
                }
                None => {
                    break Err(RandPathError::FatalWatch("event channel closed".to_string()));
                }
            },
        }
    };

    state.send_replace(WatchState::Stopping);
    table.release(&mut watcher);
    drop(watcher);
    outcome
}

/// A failed read on the notification channel; anything else is per-path.
fn is_fatal(err: &notify::Error) -> bool {
    matches!(err.kind, notify::ErrorKind::Io(_))
}

/// Owner-side handle for a spawned [`WatchService`].
pub struct WatchHandle {
    join: JoinHandle<Result<()>>,
    state: watch::Receiver<WatchState>,
    cancel: CancellationToken,
}

impl WatchHandle {
    pub fn state(&self) -> WatchState {
        *self.state.borrow()
    }

    /// Wait until the service reaches `target` or stops, whichever comes first.
    pub async fn wait_for(&mut self, target: WatchState) -> WatchState {
        match self
            .state
            .wait_for(|state| *state >= target || *state == WatchState::Stopped)
            .await
        {
            Ok(state) => *state,
            Err(_) => WatchState::Stopped,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancel the service and wait for it to release its subscriptions.
    /// The task is aborted if it outlives `grace`.
    pub async fn shutdown(self, grace: Duration) -> Result<()> {
        self.cancel.cancel();

        let mut join = self.join;
        match tokio::time::timeout(grace, &mut join).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => Err(RandPathError::FatalWatch(err.to_string())),
            Err(_) => {
                tracing::warn!("Watcher did not stop within {:?}, aborting", grace);
                join.abort();
                let _ = join.await;
                Ok(())
            }
        }
    }
}
