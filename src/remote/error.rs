use thiserror::Error;

/// The remote call itself could not complete.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("Remote store closed")]
    Closed,
    #[error("Remote store dropped the request")]
    Dropped,
    #[error("Remote call failed: {0}")]
    Failed(String),
}
