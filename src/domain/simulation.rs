use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::remote::RecordId;

/// Question count assumed when a simulation has no question sequence.
pub const DEFAULT_QUESTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationStatus {
    #[default]
    Active,
    Completed,
}

/// A compatibility quiz session between participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    /// Profile ids taking part.
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub question_sequence: Vec<String>,
    #[serde(default)]
    pub responses: Vec<Value>,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub insights: Map<String, Value>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: SimulationStatus,
}

impl Simulation {
    pub fn question_count(&self) -> usize {
        match self.question_sequence.len() {
            0 => DEFAULT_QUESTION_COUNT,
            n => n,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SimulationStatus::Completed
    }
}

/// Percentage of `questions` answered by `answered` responses.
///
/// Extra responses push the rate past 100; only completion pins it there.
pub fn completion_rate(answered: usize, questions: usize) -> f64 {
    if questions == 0 {
        return 0.0;
    }
    answered as f64 * 100.0 / questions as f64
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub participants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_sequence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl SimulationCreate {
    pub fn between<I, S>(participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            participants: participants.into_iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_questions<I, S>(mut self, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.question_sequence = Some(questions.into_iter().map(|q| q.to_string()).collect());
        self
    }
}

/// Sparse update of a simulation.
///
/// Status is not settable from outside the crate: a simulation only moves from
/// active to completed, through `SimulationProgress::complete`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_sequence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<SimulationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(1, 5), 20.0);
        assert_eq!(completion_rate(3, 5), 60.0);
        assert_eq!(completion_rate(2, 3), 200.0 / 3.0);
        assert_eq!(completion_rate(7, 5), 140.0);
        assert_eq!(completion_rate(4, 3), 400.0 / 3.0);
        assert_eq!(completion_rate(1, 0), 0.0);
    }

    #[test]
    fn test_question_count_defaults_to_five() {
        let sim: Simulation = serde_json::from_value(serde_json::json!({"id": 1})).unwrap();
        assert_eq!(sim.question_count(), DEFAULT_QUESTION_COUNT);
        assert_eq!(sim.status, SimulationStatus::Active);
    }

    #[test]
    fn test_blank_positions_count_as_questions() {
        let sim: Simulation = serde_json::from_value(serde_json::json!({
            "id": 1,
            "questionSequence": ["1", "", "3"],
        }))
        .unwrap();
        assert_eq!(sim.question_count(), 3);
    }
}
