use std::collections::BTreeMap;

use derive_more::{AsRef, Deref, Display};
use uuid::Uuid;

use crate::{
    CreateError, DEFAULT_DURATION, Exercise, ExerciseID, Language, Name, ReadError, StorageError,
    Text, translation_for,
};

#[allow(async_fn_in_trait)]
pub trait RoutineRepository {
    async fn read_routine(&self, id: &RoutineID) -> Result<Routine, ReadError>;
}

#[allow(clippy::missing_errors_doc)]
pub trait CustomRoutineRepository {
    fn read_custom_routines(&self) -> Result<BTreeMap<RoutineID, Routine>, StorageError>;
    fn write_custom_routines(
        &self,
        routines: &BTreeMap<RoutineID, Routine>,
    ) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub id: RoutineID,
    pub name: String,
    pub description: String,
    pub target_duration: u32,
    pub exercises: Vec<RoutineEntry>,
    pub translations: BTreeMap<Language, Text>,
    pub custom: bool,
}

impl Routine {
    /// Create a user-authored routine with a fresh id.
    ///
    /// Entries are ordered by their position starting at 1. Missing durations default to 30
    /// seconds, but only the given durations count towards the target duration.
    pub fn custom(
        name: &str,
        description: &str,
        exercise_ids: &[ExerciseID],
        durations: &[u32],
    ) -> Result<Self, CreateError> {
        let name = Name::new(name)?;
        let target_duration = total(durations.iter().take(exercise_ids.len()).copied());
        let exercises = exercise_ids
            .iter()
            .enumerate()
            .map(|(i, exercise_id)| RoutineEntry {
                exercise_id: exercise_id.clone(),
                duration: Some(durations.get(i).copied().unwrap_or(DEFAULT_DURATION)),
                order: u32::try_from(i + 1).unwrap_or(u32::MAX),
                needs_side_switch: None,
            })
            .collect::<Vec<_>>();
        Ok(Self {
            id: RoutineID::custom(),
            name: name.to_string(),
            description: description.trim().to_string(),
            target_duration,
            exercises,
            translations: BTreeMap::new(),
            custom: true,
        })
    }

    #[must_use]
    pub fn text(&self, language: Language) -> Text {
        let untranslated = Text {
            name: self.name.clone(),
            description: self.description.clone(),
        };
        match translation_for(&self.translations, language) {
            Some(text) => text.clone().or(untranslated),
            None => untranslated,
        }
    }

    #[must_use]
    pub fn translated(&self, language: Language) -> Routine {
        let text = self.text(language);
        Routine {
            name: text.name,
            description: text.description,
            ..self.clone()
        }
    }

    /// Entries sorted by their order. Entries with equal order keep their original sequence.
    #[must_use]
    pub fn ordered_entries(&self) -> Vec<&RoutineEntry> {
        let mut entries = self.exercises.iter().collect::<Vec<_>>();
        entries.sort_by_key(|e| e.order);
        entries
    }
}

#[derive(AsRef, Deref, Display, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoutineID(String);

impl RoutineID {
    #[must_use]
    pub fn custom() -> Self {
        Self(format!("custom-{}", Uuid::new_v4()))
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.0.starts_with("custom-")
    }
}

impl From<&str> for RoutineID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RoutineID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Reference to an exercise. Unset values are taken from the exercise when the routine is
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineEntry {
    pub exercise_id: ExerciseID,
    pub duration: Option<u32>,
    pub order: u32,
    pub needs_side_switch: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoutine {
    pub routine: Routine,
    pub exercises: Vec<ResolvedEntry>,
}

impl ResolvedRoutine {
    /// Combine the routine with the loaded exercises of its entries.
    ///
    /// `exercises` must be in the sequence of `Routine::ordered_entries`.
    #[must_use]
    pub fn new(routine: Routine, exercises: Vec<Exercise>) -> Self {
        let exercises = routine
            .ordered_entries()
            .into_iter()
            .zip(exercises)
            .map(|(entry, exercise)| ResolvedEntry {
                duration: entry.duration.unwrap_or(exercise.default_duration),
                order: entry.order,
                needs_side_switch: entry
                    .needs_side_switch
                    .unwrap_or(exercise.needs_side_switch),
                exercise,
            })
            .collect();
        Self { routine, exercises }
    }

    #[must_use]
    pub fn duration(&self) -> u32 {
        total(self.exercises.iter().map(|e| e.duration))
    }
}

/// Sum of durations in seconds, saturating at `u32::MAX`.
pub(crate) fn total(durations: impl IntoIterator<Item = u32>) -> u32 {
    durations.into_iter().fold(0, u32::saturating_add)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub exercise: Exercise,
    pub duration: u32,
    pub order: u32,
    pub needs_side_switch: bool,
}
