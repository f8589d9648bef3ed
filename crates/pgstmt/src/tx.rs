//! Retryable transactions.
//!
//! [`run_in_tx`] opens a transaction, runs the body, and commits. When the
//! body or the commit fails with a serialization failure (SQLSTATE 40001) the
//! whole attempt is rolled back and the body runs again, so statements must be
//! built inside the closure on every attempt.
//!
//! # Example
//!
//! ```ignore
//! use pgstmt::{tx, TxOptions, ExponentialBackoff};
//!
//! let opts = TxOptions::new()
//!     .max_attempts(5)
//!     .backoff(ExponentialBackoff::default());
//!
//! let moved = tx::run_in_tx(&mut client, &opts, |tx| {
//!     Box::pin(async move {
//!         pgstmt::update(|b| {
//!             b.table("accounts");
//!             b.set("balance").to_raw("balance - 100");
//!             b.filter(|c| {
//!                 c.eq("id", 1_i64);
//!             });
//!         })
//!         .execute(tx)
//!         .await
//!     })
//! })
//! .await?;
//! ```

use crate::backoff::Backoff;
use crate::error::{StmtError, StmtResult};
use futures_core::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_postgres::{Client, IsolationLevel, Transaction};

/// Attempts used when `max_attempts` is not positive.
pub const DEFAULT_MAX_ATTEMPTS: i32 = 10;

/// Transaction and retry settings.
#[derive(Clone)]
pub struct TxOptions {
    pub isolation_level: IsolationLevel,
    pub read_only: bool,
    pub deferrable: bool,
    /// Values `<= 0` fall back to [`DEFAULT_MAX_ATTEMPTS`].
    pub max_attempts: i32,
    /// Wait between attempts. `None` retries immediately.
    pub backoff: Option<Arc<dyn Backoff>>,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            isolation_level: IsolationLevel::Serializable,
            read_only: false,
            deferrable: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: None,
        }
    }
}

impl fmt::Debug for TxOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxOptions")
            .field("isolation_level", &self.isolation_level)
            .field("read_only", &self.read_only)
            .field("deferrable", &self.deferrable)
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff.as_ref().map(|_| ".."))
            .finish()
    }
}

impl TxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = level;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn deferrable(mut self, deferrable: bool) -> Self {
        self.deferrable = deferrable;
        self
    }

    pub fn max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn backoff(mut self, backoff: impl Backoff + 'static) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    /// The number of attempts the retry loop will actually make.
    pub fn attempts(&self) -> u32 {
        u32::try_from(self.max_attempts)
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS as u32)
    }
}

// ==================== Retry loop ====================

/// What the loop does with the outcome of one attempt.
enum Step<T> {
    Done(StmtResult<Option<T>>),
    Retry(StmtError),
}

fn step<T>(result: StmtResult<T>) -> Step<T> {
    match result {
        Ok(value) => Step::Done(Ok(Some(value))),
        Err(StmtError::AbortTx) => Step::Done(Ok(None)),
        Err(err) if err.is_serialization_failure() => Step::Retry(err),
        Err(err) => Step::Done(Err(err)),
    }
}

/// Sleeps before the next attempt. No wait follows the last attempt.
async fn pause(opts: &TxOptions, attempt: u32, attempts: u32) {
    if attempt + 1 >= attempts {
        return;
    }
    let Some(backoff) = &opts.backoff else {
        return;
    };
    let delay = backoff.delay(attempt);
    if delay.is_zero() {
        return;
    }
    tokio::time::sleep(delay).await;
}

fn retrying(attempt: u32, err: &StmtError) {
    #[cfg(feature = "tracing")]
    tracing::debug!(target: "pgstmt.tx", attempt, error = %err, "serialization failure, retrying");
    #[cfg(not(feature = "tracing"))]
    let _ = (attempt, err);
}

fn exhausted(attempts: u32) {
    #[cfg(feature = "tracing")]
    tracing::warn!(target: "pgstmt.tx", attempts, "giving up after repeated serialization failures");
    #[cfg(not(feature = "tracing"))]
    let _ = attempts;
}

/// Runs `f` until it succeeds, fails with anything other than a
/// serialization failure, or the attempts run out.
///
/// `f` receives the zero-based attempt number. [`StmtError::AbortTx`] stops
/// the loop with `Ok(None)`. When every attempt fails, the last
/// serialization failure is returned.
///
/// This is the loop behind [`run_in_tx`] without the transaction handling,
/// for callers that manage their own connections.
pub async fn retry<T, F, Fut>(opts: &TxOptions, mut f: F) -> StmtResult<Option<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = StmtResult<T>>,
{
    let attempts = opts.attempts();
    let mut last = None;
    for attempt in 0..attempts {
        match step(f(attempt).await) {
            Step::Done(result) => return result,
            Step::Retry(err) => {
                retrying(attempt, &err);
                last = Some(err);
                pause(opts, attempt, attempts).await;
            }
        }
    }
    exhausted(attempts);
    Err(last.unwrap_or_else(|| StmtError::Other("no transaction attempts were made".into())))
}

// ==================== Transactions ====================

/// Runs `f` inside a transaction, committing on success and retrying the whole
/// transaction on serialization failure.
///
/// Returning [`StmtError::AbortTx`] from `f` stops without an error and yields
/// `Ok(None)`. Nothing is committed: the transaction is rolled back, so any
/// writes made before the abort are discarded. Any other error also rolls back
/// and is returned as-is. Dropping the returned future cancels the current
/// attempt, including a pending backoff wait.
pub async fn run_in_tx<T, F>(
    client: &mut Client,
    opts: &TxOptions,
    mut f: F,
) -> StmtResult<Option<T>>
where
    F: for<'t> FnMut(&'t Transaction<'t>) -> BoxFuture<'t, StmtResult<T>>,
{
    let attempts = opts.attempts();
    let mut last = None;
    for attempt in 0..attempts {
        match step(attempt_once(client, opts, &mut f).await) {
            Step::Done(result) => return result,
            Step::Retry(err) => {
                retrying(attempt, &err);
                last = Some(err);
                pause(opts, attempt, attempts).await;
            }
        }
    }
    exhausted(attempts);
    Err(last.unwrap_or_else(|| StmtError::Other("no transaction attempts were made".into())))
}

async fn attempt_once<T, F>(client: &mut Client, opts: &TxOptions, f: &mut F) -> StmtResult<T>
where
    F: for<'t> FnMut(&'t Transaction<'t>) -> BoxFuture<'t, StmtResult<T>>,
{
    let tx = client
        .build_transaction()
        .isolation_level(opts.isolation_level)
        .read_only(opts.read_only)
        .deferrable(opts.deferrable)
        .start()
        .await
        .map_err(StmtError::from_db_error)?;

    let result = f(&tx).await;
    match result {
        Ok(value) => {
            tx.commit().await.map_err(StmtError::from_db_error)?;
            Ok(value)
        }
        Err(error) => match tx.rollback().await {
            Ok(()) => Err(error),
            Err(rollback_err) => Err(StmtError::Other(format!(
                "{error} (rollback failed: {rollback_err})"
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn conflict() -> StmtError {
        StmtError::SerializationFailure("could not serialize access".into())
    }

    #[test]
    fn test_attempts_fall_back_to_default() {
        assert_eq!(TxOptions::new().attempts(), 10);
        assert_eq!(TxOptions::new().max_attempts(0).attempts(), 10);
        assert_eq!(TxOptions::new().max_attempts(-3).attempts(), 10);
        assert_eq!(TxOptions::new().max_attempts(3).attempts(), 3);
    }

    #[test]
    fn test_default_isolation_is_serializable() {
        let opts = TxOptions::default();
        assert!(matches!(opts.isolation_level, IsolationLevel::Serializable));
        assert!(!opts.read_only);
        assert!(!opts.deferrable);
        assert!(opts.backoff.is_none());
        assert!(format!("{opts:?}").contains("max_attempts: 10"));
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry(&TxOptions::new(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(conflict())
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: StmtResult<Option<()>> = retry(&TxOptions::new(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StmtError::not_found("gone")) }
        })
        .await;
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_abort_returns_none() {
        let calls = AtomicU32::new(0);
        let result: StmtResult<Option<i32>> = retry(&TxOptions::new(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StmtError::AbortTx) }
        })
        .await;
        assert_eq!(result.unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let opts = TxOptions::new().max_attempts(4);
        let result: StmtResult<Option<()>> = retry(&opts, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(conflict()) }
        })
        .await;
        assert!(result.unwrap_err().is_serialization_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_backoff_between_attempts_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let opts = TxOptions::new()
            .max_attempts(3)
            .backoff(move |attempt: u32| {
                recorder.lock().unwrap().push(attempt);
                Duration::from_millis(1)
            });

        let result: StmtResult<Option<()>> = retry(&opts, |_| async { Err(conflict()) }).await;
        assert!(result.is_err());
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_zero_delay_skips_wait() {
        let opts = TxOptions::new()
            .max_attempts(3)
            .backoff(|_: u32| Duration::ZERO);
        let calls = AtomicU32::new(0);
        let result = retry(&opts, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(conflict())
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), Some("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
