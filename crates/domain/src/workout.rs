use crate::{ExerciseID, ResolvedRoutine, routine::total};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Both,
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub exercise_id: ExerciseID,
    /// Index of the routine entry this step belongs to.
    pub entry: usize,
    pub duration: u32,
    pub side: Side,
}

/// Sequence of timed steps of a routine.
///
/// An exercise that needs a side switch is split into two steps. The first side gets the extra
/// second of an odd duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    steps: Vec<Step>,
    entries: usize,
    position: usize,
}

impl Workout {
    #[must_use]
    pub fn new(routine: &ResolvedRoutine) -> Self {
        let mut steps = Vec::new();
        for (entry, e) in routine.exercises.iter().enumerate() {
            if e.needs_side_switch {
                let first = e.duration.div_ceil(2);
                steps.push(Step {
                    exercise_id: e.exercise.id.clone(),
                    entry,
                    duration: first,
                    side: Side::First,
                });
                steps.push(Step {
                    exercise_id: e.exercise.id.clone(),
                    entry,
                    duration: e.duration - first,
                    side: Side::Second,
                });
            } else {
                steps.push(Step {
                    exercise_id: e.exercise.id.clone(),
                    entry,
                    duration: e.duration,
                    side: Side::Both,
                });
            }
        }
        Self {
            steps,
            entries: routine.exercises.len(),
            position: 0,
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn total_duration(&self) -> u32 {
        total(self.steps.iter().map(|s| s.duration))
    }

    #[must_use]
    pub fn remaining_duration(&self) -> u32 {
        total(self.steps.iter().skip(self.position).map(|s| s.duration))
    }

    #[must_use]
    pub fn current(&self) -> Option<&Step> {
        self.steps.get(self.position)
    }

    /// Move to the next step. Returns `false` if the workout is finished.
    pub fn advance(&mut self) -> bool {
        if self.position < self.steps.len() {
            self.position += 1;
        }
        self.position < self.steps.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.steps.len()
    }

    /// One-based number of the current exercise and the number of exercises.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let current = self.current().map_or(self.entries, |s| s.entry + 1);
        (current, self.entries)
    }

    /// Whether the current step starts the second side of an exercise.
    #[must_use]
    pub fn is_side_switch(&self) -> bool {
        self.current().is_some_and(|s| s.side == Side::Second)
    }
}
