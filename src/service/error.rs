use thiserror::Error;

use crate::remote::{RecordId, TransportError};

/// Why a service operation produced no result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{entity} request rejected: {message}")]
    Rejected { entity: &'static str, message: String },
    #[error("No {entity} record succeeded ({failed} failed)")]
    RecordsFailed { entity: &'static str, failed: usize },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: RecordId },
    #[error("Could not encode {entity} payload: {reason}")]
    Encode { entity: &'static str, reason: String },
    #[error("Could not decode {entity} record: {reason}")]
    Decode { entity: &'static str, reason: String },
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
