use crate::{Result, ToneCanvasError};
use crossbeam_channel::{bounded, select, tick, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// A callback run on its own thread at a fixed period until cancelled
///
/// Cancellation is synchronous: once [`PeriodicTask::cancel`] returns the
/// callback will not run again. Dropping the task cancels it.
pub struct PeriodicTask {
    name: String,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Start running `f` every `period`; the first call happens one period
    /// after spawning
    pub fn spawn<F>(name: impl Into<String>, period: Duration, mut f: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(period);

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || loop {
                select! {
                    // Fires on an explicit stop or when the sender is dropped
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => f(),
                }
            })
            .map_err(|e| ToneCanvasError::ChannelError(format!("Failed to spawn {}: {}", name, e)))?;

        debug!("Started periodic task {} every {:?}", name, period);

        Ok(Self {
            name,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the task and wait for its thread to exit
    pub fn cancel(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Periodic task {} panicked", self.name);
            } else {
                debug!("Stopped periodic task {}", self.name);
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
