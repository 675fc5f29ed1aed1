use thiserror::Error;

/// Error taxonomy of the client core.
///
/// Remote failures of every kind (transport, non-success status, malformed
/// body) collapse into `Remote`, carrying the human-readable message the
/// backend provided or a per-operation fallback. Callers display the message;
/// nothing is retried.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Remote(String),
    #[error("Storage error: {0}")]
    Storage(String),
}
