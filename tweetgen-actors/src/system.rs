//! Task tracking and shutdown signaling shared by every actor.
//!
//! Actors subscribe to the broadcast channel for cooperative shutdown; the
//! `JoinSet` lets teardown wait for every tracked task.
use anyhow::Result;
use tokio::{sync::broadcast, task::JoinSet};

/// Cloneable trigger for a global shutdown, handed to the UI and feeders.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
    pub fn signal(&self) {
        let _ = self.tx.send(());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

pub struct ActorSystem {
    joinset: JoinSet<Result<()>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorSystem {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);
        Self {
            joinset: JoinSet::new(),
            shutdown_tx,
        }
    }

    pub fn shutdown_notifier(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    pub fn track(&mut self, fut: impl std::future::Future<Output = Result<()>> + Send + 'static) {
        self.joinset.spawn(fut);
    }

    /// Signal shutdown and wait for every tracked task; the first failure wins.
    pub async fn graceful_shutdown(mut self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        let mut first_err = None;
        while let Some(res) = self.joinset.join_next().await {
            let outcome = res.map_err(anyhow::Error::from).and_then(|r| r);
            if let Err(e) = outcome {
                tracing::warn!(error = ?e, "task ended with error during shutdown");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_waits_for_tracked_tasks() {
        let mut sys = ActorSystem::new();
        let mut rx = sys.shutdown_notifier();
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        sys.track(async move {
            let _ = rx.recv().await;
            let _ = done_tx.send(());
            Ok(())
        });
        sys.graceful_shutdown().await.unwrap();
        assert!(done_rx.await.is_ok());
    }

    #[tokio::test]
    async fn shutdown_reports_task_errors() {
        let mut sys = ActorSystem::new();
        sys.track(async { anyhow::bail!("boom") });
        let err = sys.graceful_shutdown().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
