//! Per-operation deadlines for storage calls.

use std::future::Future;
use std::time::Duration;

/// A storage operation did not finish in time.
///
/// The operation's future was dropped, which returns its connection to the
/// pool and rolls back any transaction it had open.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation} exceeded its {limit:?} deadline")]
pub struct DeadlineExceeded {
    pub operation: &'static str,
    pub limit: Duration,
}

/// Run `fut`, giving up after `limit`.
pub async fn within<F: Future>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<F::Output, DeadlineExceeded> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| DeadlineExceeded { operation, limit })
}
