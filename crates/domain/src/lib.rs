#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use std::collections::BTreeMap;

mod catalog;
mod error;
mod exercise;
mod folder;
mod language;
mod name;
mod routine;
mod service;
mod store;
mod translation;
mod workout;

pub use catalog::{ContentIndex, ContentIndexRepository, IndexedExercise};
pub use error::{CreateError, EntityKind, ReadError, StorageError};
pub use exercise::{
    CATEGORIES, DEFAULT_DURATION, Exercise, ExerciseFilter, ExerciseID, ExerciseRepository,
    ExerciseText,
};
pub use folder::{Folder, FolderID, FolderRepository, ResolvedFolder};
pub use language::Language;
pub use name::{MAX_NAME_LENGTH, Name, NameError};
pub use routine::{
    CustomRoutineRepository, ResolvedEntry, ResolvedRoutine, Routine, RoutineEntry, RoutineID,
    RoutineRepository,
};
pub use service::{ContentService, Service, TranslationService};
pub use store::ContentStore;
pub use translation::{
    Node, TranslationRepository, TranslationResolver, fallback_bundle, interpolate,
};
pub use workout::{Side, Step, Workout};

/// Translatable display fields of routines and folders.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Text {
    pub name: String,
    pub description: String,
}

impl Text {
    /// Replace empty fields by the fields of `other`.
    pub(crate) fn or(self, other: Text) -> Text {
        Text {
            name: if self.name.is_empty() {
                other.name
            } else {
                self.name
            },
            description: if self.description.is_empty() {
                other.description
            } else {
                self.description
            },
        }
    }
}

pub(crate) fn translation_for<T>(
    translations: &BTreeMap<Language, T>,
    language: Language,
) -> Option<&T> {
    translations
        .get(&language)
        .or_else(|| translations.get(&Language::DEFAULT))
}
