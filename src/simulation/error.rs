use thiserror::Error;

use crate::remote::RecordId;
use crate::service::ServiceError;

/// Failures of simulation progress operations. Unlike plain service reads,
/// these are returned to the caller rather than collapsed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("Simulation not found: {0}")]
    NotFound(RecordId),
    #[error("No active simulation found")]
    NoActiveSimulation,
    #[error("Simulation {0} is already completed")]
    AlreadyCompleted(RecordId),
    #[error("Failed to persist simulation {id}: {source}")]
    UpdateFailed {
        id: RecordId,
        #[source]
        source: ServiceError,
    },
    #[error(transparent)]
    Service(#[from] ServiceError),
}
