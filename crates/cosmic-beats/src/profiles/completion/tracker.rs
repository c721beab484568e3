use serde::Serialize;

use super::rewards::CompletionThreshold;

/// Observation state of a single profile's completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CompletionState {
    Stable { percentage: u8 },
    Evaluating { previous: u8, current: u8 },
}

/// Threshold-crossing bookkeeping for one profile.
///
/// `begin` moves to `Evaluating` and reports the crossing, if any. The caller persists the
/// outcome and then calls `settle` to advance the marker, or `abort` to keep the previous one
/// so the same crossing is offered again on the next evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionTracker {
    state: CompletionState,
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

impl CompletionTracker {
    /// Tracker for a newly created profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker resuming from an already recorded percentage.
    pub fn starting_at(percentage: u8) -> Self {
        Self {
            state: CompletionState::Stable {
                percentage: percentage.min(100),
            },
        }
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    /// Last percentage that was fully settled.
    pub fn previous(&self) -> u8 {
        match self.state {
            CompletionState::Stable { percentage } => percentage,
            CompletionState::Evaluating { previous, .. } => previous,
        }
    }

    pub fn begin(&mut self, current: u8) -> Option<CompletionThreshold> {
        let previous = self.previous();
        let current = current.min(100);
        self.state = CompletionState::Evaluating { previous, current };
        CompletionThreshold::crossed(previous, current)
    }

    /// Accept the pending evaluation. No-op while stable.
    pub fn settle(&mut self) -> u8 {
        if let CompletionState::Evaluating { current, .. } = self.state {
            self.state = CompletionState::Stable {
                percentage: current,
            };
        }
        self.previous()
    }

    /// Drop the pending evaluation and keep the previous marker.
    pub fn abort(&mut self) -> u8 {
        let previous = self.previous();
        self.state = CompletionState::Stable {
            percentage: previous,
        };
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(tracker: &mut CompletionTracker, current: u8) -> Option<CompletionThreshold> {
        let crossed = tracker.begin(current);
        tracker.settle();
        crossed
    }

    #[test]
    fn starts_stable_at_zero() {
        let tracker = CompletionTracker::new();
        assert_eq!(tracker.state(), CompletionState::Stable { percentage: 0 });
    }

    #[test]
    fn bulk_jump_fires_a_single_top_tier() {
        let mut tracker = CompletionTracker::starting_at(40);

        let crossed = tracker.begin(100);
        assert_eq!(
            tracker.state(),
            CompletionState::Evaluating {
                previous: 40,
                current: 100
            }
        );
        assert_eq!(crossed, Some(CompletionThreshold::Complete));
        assert_eq!(tracker.settle(), 100);
        assert_eq!(step(&mut tracker, 100), None);
    }

    #[test]
    fn downward_move_rearms_the_boundary() {
        let mut tracker = CompletionTracker::starting_at(80);

        assert_eq!(step(&mut tracker, 60), None);
        assert_eq!(tracker.previous(), 60);
        assert_eq!(
            step(&mut tracker, 80),
            Some(CompletionThreshold::ThreeQuarters)
        );
    }

    #[test]
    fn abort_keeps_crossing_available() {
        let mut tracker = CompletionTracker::starting_at(45);

        assert_eq!(tracker.begin(55), Some(CompletionThreshold::Half));
        assert_eq!(tracker.abort(), 45);
        assert_eq!(tracker.state(), CompletionState::Stable { percentage: 45 });
        assert_eq!(tracker.begin(55), Some(CompletionThreshold::Half));
    }

    #[test]
    fn repeated_begin_measures_from_settled_marker() {
        let mut tracker = CompletionTracker::starting_at(10);

        assert_eq!(tracker.begin(60), Some(CompletionThreshold::Half));
        assert_eq!(tracker.begin(80), Some(CompletionThreshold::ThreeQuarters));
        assert_eq!(tracker.previous(), 10);
    }

    #[test]
    fn clamps_out_of_range_percentages() {
        let mut tracker = CompletionTracker::starting_at(250);
        assert_eq!(tracker.previous(), 100);
        assert_eq!(tracker.begin(200), None);
    }
}
