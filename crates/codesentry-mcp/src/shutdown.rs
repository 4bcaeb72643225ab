//! Graceful shutdown coordination.
//!
//! A [`Shutdown`] handle fires at most once. Signal listeners call
//! [`Shutdown::trigger`] and the server loop awaits [`Shutdown::wait`].

use std::io;
use std::sync::Arc;

use tokio::sync::watch;

/// One-shot shutdown flag shared between tasks.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown.
    ///
    /// Returns `true` for the call that actually fired the flag, `false` for
    /// every later call.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once shutdown has been requested, including earlier requests.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

/// Wait for the first termination signal and return its name.
#[cfg(unix)]
pub async fn termination_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = interrupt.recv() => Ok("SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

/// Wait for the first termination signal and return its name.
#[cfg(not(unix))]
pub async fn termination_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl-C")
}

/// Trigger `shutdown` on every termination signal until it has fired.
///
/// Signals arriving after the first are absorbed by the one-shot flag.
pub async fn listen_for_signals(shutdown: Shutdown) -> io::Result<()> {
    loop {
        let signal = termination_signal().await?;
        if shutdown.trigger() {
            tracing::info!("Received {}, shutting down gracefully", signal);
            return Ok(());
        }
        tracing::debug!("Received {} while shutdown already in progress", signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_fires_once() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());

        assert!(shutdown.trigger());
        assert!(!shutdown.trigger());
        assert!(shutdown.is_triggered());
    }

    #[test]
    fn test_clones_share_state() {
        let shutdown = Shutdown::new();
        let other = shutdown.clone();

        assert!(other.trigger());
        assert!(shutdown.is_triggered());
        assert!(!shutdown.trigger());
    }

    #[tokio::test]
    async fn test_wait_after_trigger_returns() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), shutdown.wait())
            .await
            .expect("wait should complete after an earlier trigger");
    }

    #[tokio::test]
    async fn test_wait_wakes_on_trigger() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.clone();
        let handle = tokio::spawn(async move { waiter.wait().await });

        tokio::task::yield_now().await;
        assert!(shutdown.trigger());

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_triggers_fire_once() {
        let shutdown = Shutdown::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = shutdown.clone();
                tokio::spawn(async move { s.trigger() })
            })
            .collect();

        let mut fired = 0;
        for handle in handles {
            if handle.await.unwrap() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }
}
