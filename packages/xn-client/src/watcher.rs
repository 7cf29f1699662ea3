//! Poll a broadcast transaction until it settles.

use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::debug;

use crate::metrics::METRICS;
use crate::provider::{NetworkProvider, TransactionOnNetwork};
use crate::Error;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(6);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

pub struct TransactionWatcher<'a, P: NetworkProvider + ?Sized> {
    provider: &'a P,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a, P: NetworkProvider + ?Sized> TransactionWatcher<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timing(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.timeout = timeout;
        self
    }

    /// Wait for a final status, then fetch the full transaction. A failed
    /// transaction is returned as-is; callers decide what failure means.
    pub async fn await_completed(&self, hash: &str) -> Result<TransactionOnNetwork, Error> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            METRICS.status_polls.fetch_add(1, Ordering::Relaxed);
            let status = self.provider.get_transaction_status(hash).await?;
            debug!(tx = hash, status = %status, "Polled transaction");
            if status.is_final() {
                let mut tx = self.provider.get_transaction(hash).await?;
                tx.status = status;
                return Ok(tx);
            }
            if tokio::time::Instant::now() + self.poll_interval > deadline {
                return Err(Error::Timeout(format!(
                    "transaction {hash} still {status} after {}s",
                    self.timeout.as_secs()
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
