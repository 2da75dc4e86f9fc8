use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

use super::notify::{Notifier, TracingNotifier};
use crate::remote::RemoteClient;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Supplies the compatibility score given to records created without one.
///
/// There is no matching algorithm behind this; it stands in for one.
pub trait ScoreSource: Send + Sync {
    fn compatibility_score(&self) -> u8;
}

/// Uniform in [70, 100).
pub struct RandomScore;

impl ScoreSource for RandomScore {
    fn compatibility_score(&self) -> u8 {
        rand::thread_rng().gen_range(70..100)
    }
}

pub struct FixedScore(pub u8);

impl ScoreSource for FixedScore {
    fn compatibility_score(&self) -> u8 {
        self.0
    }
}

/// Collaborators injected into every service.
#[derive(Clone)]
pub struct ServiceContext {
    pub remote: Arc<dyn RemoteClient>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub scores: Arc<dyn ScoreSource>,
}

impl ServiceContext {
    /// Context with the system clock, random scores and log-only notices.
    pub fn new(remote: Arc<dyn RemoteClient>) -> Self {
        Self {
            remote,
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(SystemClock),
            scores: Arc::new(RandomScore),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_scores(mut self, scores: Arc<dyn ScoreSource>) -> Self {
        self.scores = scores;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_score_stays_in_placeholder_range() {
        for _ in 0..500 {
            let score = RandomScore.compatibility_score();
            assert!((70..100).contains(&score), "score {score} out of range");
        }
    }
}
