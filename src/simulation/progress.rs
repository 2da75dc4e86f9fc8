use serde_json::Value;
use tracing::{error, info, instrument};

use super::error::SimulationError;
use crate::domain::{completion_rate, Simulation, SimulationPatch, SimulationStatus};
use crate::remote::{Filter, RecordId};
use crate::service::{ServiceError, SimulationService};

/// Quiz progress on top of the simulation service.
#[derive(Clone)]
pub struct SimulationProgress {
    service: SimulationService,
}

impl SimulationProgress {
    pub fn new(service: SimulationService) -> Self {
        Self { service }
    }

    /// Plain CRUD access to simulations.
    pub fn service(&self) -> &SimulationService {
        &self.service
    }

    /// The first simulation whose status is `active`.
    #[instrument(skip(self))]
    pub async fn get_active(&self) -> Result<Simulation, SimulationError> {
        let active = self
            .service
            .try_find(vec![Filter::equal_to("status", "active")])
            .await
            .map_err(|e| {
                error!(error = %e, "Error fetching active simulation");
                e
            })?;
        active.into_iter().next().ok_or_else(|| {
            error!("No active simulation found");
            SimulationError::NoActiveSimulation
        })
    }

    /// Appends one response and recomputes the completion rate against the
    /// stored question sequence.
    #[instrument(skip(self, response))]
    pub async fn add_response(
        &self,
        id: RecordId,
        response: Value,
    ) -> Result<Simulation, SimulationError> {
        let simulation = self.load(id).await?;
        if simulation.is_completed() {
            return Err(SimulationError::AlreadyCompleted(id));
        }

        let questions = simulation.question_count();
        let mut responses = simulation.responses;
        responses.push(response);
        let rate = completion_rate(responses.len(), questions);
        info!(answered = responses.len(), rate, "Recording response");

        let patch = SimulationPatch {
            responses: Some(responses),
            completion_rate: Some(rate),
            ..SimulationPatch::default()
        };
        self.persist(id, patch).await
    }

    /// Finalizes the simulation with `responses`, regardless of how many
    /// questions they cover.
    #[instrument(skip(self, responses), fields(responses = responses.len()))]
    pub async fn complete(
        &self,
        id: RecordId,
        responses: Vec<Value>,
    ) -> Result<Simulation, SimulationError> {
        let patch = SimulationPatch {
            responses: Some(responses),
            completion_rate: Some(100.0),
            completed_at: Some(self.service.context().clock.now()),
            status: Some(SimulationStatus::Completed),
            ..SimulationPatch::default()
        };
        self.persist(id, patch).await
    }

    async fn load(&self, id: RecordId) -> Result<Simulation, SimulationError> {
        self.service.try_get_by_id(id).await.map_err(|e| {
            error!(error = %e, "Error loading simulation");
            match e {
                ServiceError::NotFound { .. } => SimulationError::NotFound(id),
                other => SimulationError::Service(other),
            }
        })
    }

    async fn persist(
        &self,
        id: RecordId,
        patch: SimulationPatch,
    ) -> Result<Simulation, SimulationError> {
        self.service.try_update(id, patch).await.map_err(|source| {
            error!(error = %source, "Error persisting simulation");
            SimulationError::UpdateFailed { id, source }
        })
    }
}
