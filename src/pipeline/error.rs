use crate::backend::BackendError;
use thiserror::Error;

/// A failed feed cycle. Either step aborts the cycle and nothing is retried.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Refreshing the photo index failed: {0}")]
    Refresh(#[source] BackendError),

    #[error("Querying nearby photos failed: {0}")]
    Query(#[source] BackendError),
}
