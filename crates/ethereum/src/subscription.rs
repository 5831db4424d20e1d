use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use contract_core::{Error, Result};
use ethers::providers::Middleware;
use ethers::types::{Log, U256};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Handle to a running event subscription.
///
/// Dropping the handle cancels the subscription.
#[derive(Debug)]
pub struct Subscription {
    cancel: Option<oneshot::Sender<()>>,
    err: Option<oneshot::Receiver<Error>>,
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Run `task` on the runtime; it receives the cancellation signal and its error is kept for `err`
    pub(crate) fn spawn<F, Fut>(task: F) -> Self
    where
        F: FnOnce(oneshot::Receiver<()>) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (err_tx, err_rx) = oneshot::channel();
        let run = task(cancel_rx);

        let handle = tokio::spawn(async move {
            if let Err(e) = run.await {
                warn!("Subscription failed: {}", e);
                let _ = err_tx.send(e);
            }
        });

        Self {
            cancel: Some(cancel_tx),
            err: Some(err_rx),
            handle,
        }
    }

    /// Stop delivering events. Idempotent.
    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Whether the delivery loop is still running
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Wait for the subscription to end.
    ///
    /// Returns the error that terminated it, or `None` if it ended because it was
    /// cancelled or its sink was closed. Only the first call can observe the error.
    pub async fn err(&mut self) -> Option<Error> {
        match self.err.take() {
            Some(err) => err.await.ok(),
            None => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Forward logs from an installed node-side filter into `sink` until cancelled.
///
/// The filter is uninstalled when the loop ends.
pub(crate) async fn watch_logs<M, D>(
    client: Arc<M>,
    filter_id: U256,
    poll_interval: Duration,
    decode: fn(Log) -> Result<D>,
    sink: mpsc::Sender<D>,
    mut cancel: oneshot::Receiver<()>,
) -> Result<()>
where
    M: Middleware + 'static,
    D: Send + 'static,
{
    let result = forward_logs(client.as_ref(), filter_id, poll_interval, decode, &sink, &mut cancel).await;

    if let Err(e) = client.uninstall_filter(filter_id).await {
        warn!(%filter_id, "Failed to uninstall log filter: {}", e);
    }

    result
}

async fn forward_logs<M, D>(
    client: &M,
    filter_id: U256,
    poll_interval: Duration,
    decode: fn(Log) -> Result<D>,
    sink: &mpsc::Sender<D>,
    cancel: &mut oneshot::Receiver<()>,
) -> Result<()>
where
    M: Middleware,
{
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!(%filter_id, ?poll_interval, "Watching logs");
    loop {
        tokio::select! {
            _ = &mut *cancel => {
                debug!(%filter_id, "Subscription cancelled");
                return Ok(());
            }
            _ = ticker.tick() => {
                let logs: Vec<Log> = client
                    .get_filter_changes(filter_id)
                    .await
                    .map_err(|e| Error::chain(format!("Failed to poll log filter {}: {}", filter_id, e)))?;

                for log in logs {
                    let event = decode(log)?;
                    tokio::select! {
                        sent = sink.send(event) => {
                            if sent.is_err() {
                                debug!(%filter_id, "Sink closed");
                                return Ok(());
                            }
                        }
                        _ = &mut *cancel => {
                            debug!(%filter_id, "Subscription cancelled");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
