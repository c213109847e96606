//! Database query timeout helpers
//!
//! Every collaborator call is bounded so that a stalled connection surfaces as
//! an error instead of holding a tournament's critical section forever.

use super::errors::{RepositoryError, RepositoryResult};
use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for single queries (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for transactions (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Execute a repository operation with timeout
///
/// A transaction still open when the deadline passes is dropped, which rolls
/// it back.
///
/// # Arguments
///
/// * `duration` - Timeout duration
/// * `future` - Async operation to execute
///
/// # Returns
///
/// * `RepositoryResult<T>` - Result or `RepositoryError::Timeout`
///
/// # Example
///
/// ```no_run
/// use swiss_pairing::db::RepositoryError;
/// use swiss_pairing::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::PgPool;
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
///
/// let row = with_timeout(DEFAULT_QUERY_TIMEOUT, async {
///     Ok::<_, RepositoryError>(sqlx::query("SELECT * FROM players WHERE id = $1")
///         .bind(1_i64)
///         .fetch_one(pool)
///         .await?)
/// })
/// .await?;
///
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> RepositoryResult<T>
where
    F: std::future::Future<Output = RepositoryResult<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::Timeout(duration)),
    }
}
