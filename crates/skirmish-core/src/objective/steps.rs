//! Steps objective: end the match after a fixed number of ticks.

use crate::events::SimEvent;
use crate::report::ObjectiveReport;
use crate::scene::Scene;

use super::ObjectiveTracker;

/// Stops the match once the step counter reaches the configured limit.
#[derive(Debug, Clone)]
pub struct StepsTracker {
    steps: u64,
    max_steps: u64,
}

impl StepsTracker {
    /// Creates a tracker with the given step limit (at least 1).
    #[must_use]
    pub fn new(max_steps: u64) -> Self {
        Self {
            steps: 0,
            max_steps: max_steps.max(1),
        }
    }

    /// Steps observed so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }
}

impl ObjectiveTracker for StepsTracker {
    fn observe(&mut self, event: &SimEvent, _scene: &mut Scene) {
        if let SimEvent::StepCompleted { step } = event {
            self.steps = *step;
        }
    }

    fn update(&mut self, _dt: f32, _scene: &Scene) {}

    fn should_stop(&self) -> bool {
        self.steps >= self.max_steps
    }

    fn report(&self) -> ObjectiveReport {
        ObjectiveReport::Steps {
            steps: self.steps,
            max_steps: self.max_steps,
        }
    }
}
