use std::{cell::Cell, fmt::Display};

use log::{debug, error};

use crate::{
    ContentIndexRepository, ContentStore, CreateError, CustomRoutineRepository, Exercise,
    ExerciseFilter, ExerciseID, ExerciseRepository, Folder, FolderID, FolderRepository, Language,
    ReadError, ResolvedFolder, ResolvedRoutine, Routine, RoutineID, RoutineRepository,
    StorageError, TranslationRepository, TranslationResolver, Workout,
};

#[allow(async_fn_in_trait)]
pub trait ContentService {
    async fn load_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError>;
    async fn load_routine(&self, id: &RoutineID) -> Result<ResolvedRoutine, ReadError>;
    async fn load_folder(&self, id: &FolderID) -> Result<ResolvedFolder, ReadError>;

    fn translated_exercise(&self, id: &ExerciseID) -> Option<Exercise>;
    fn translated_routine(&self, id: &RoutineID) -> Option<Routine>;
    fn translated_folder(&self, id: &FolderID) -> Option<Folder>;
    fn search_exercises(&self, query: &str, filter: &ExerciseFilter) -> Vec<Exercise>;
    fn workout(&self, id: &RoutineID) -> Option<Workout>;

    fn create_custom_routine(
        &self,
        name: &str,
        description: &str,
        exercise_ids: &[ExerciseID],
        durations: &[u32],
    ) -> Result<Routine, CreateError>;
    fn save_custom_routine(&self, routine: &Routine) -> Result<(), CreateError>;
    fn delete_custom_routine(&self, id: &RoutineID) -> Result<(), StorageError>;
    fn load_custom_routines(&self) -> Result<usize, StorageError>;
}

pub trait TranslationService {
    fn language(&self) -> Language;
    fn set_language(&self, language: Language);
    fn translate(&self, key: &str, params: &[(&str, &dyn Display)]) -> String;
}

/// Entry point for the presentation layer.
///
/// Owns the content store, the translation resolver and the current language.
pub struct Service<R> {
    store: ContentStore<R>,
    translations: TranslationResolver<R>,
    language: Cell<Language>,
}

impl<R: Clone> Service<R> {
    pub fn new(repository: R, language: Language) -> Self {
        Self {
            store: ContentStore::new(repository.clone()),
            translations: TranslationResolver::new(repository),
            language: Cell::new(language),
        }
    }
}

impl<R> Service<R> {
    pub fn store(&self) -> &ContentStore<R> {
        &self.store
    }

    pub fn translations(&self) -> &TranslationResolver<R> {
        &self.translations
    }

    /// Drop all cached content.
    pub fn reset(&self) {
        debug!("clearing content cache");
        self.store.clear_cache();
    }
}

impl<R> Service<R>
where
    R: TranslationRepository
        + ContentIndexRepository
        + ExerciseRepository
        + RoutineRepository
        + FolderRepository,
{
    pub async fn load_translations(&self) {
        self.translations.load().await;
    }
}

macro_rules! log_on_error {
    ($func: expr, $action: literal, $entity: literal) => {{
        let result = $func;
        if let Err(ref err) = result {
            match err {
                ReadError::NotFound { .. } | ReadError::Storage(StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                ReadError::Storage(_) => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            }
        }
        result
    }};
}

impl<R> ContentService for Service<R>
where
    R: ExerciseRepository
        + RoutineRepository
        + FolderRepository
        + CustomRoutineRepository
        + 'static,
{
    async fn load_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError> {
        log_on_error!(self.store.load_exercise(id).await, "load", "exercise")
    }

    async fn load_routine(&self, id: &RoutineID) -> Result<ResolvedRoutine, ReadError> {
        log_on_error!(self.store.load_routine(id).await, "load", "routine")
    }

    async fn load_folder(&self, id: &FolderID) -> Result<ResolvedFolder, ReadError> {
        log_on_error!(self.store.load_folder(id).await, "load", "folder")
    }

    fn translated_exercise(&self, id: &ExerciseID) -> Option<Exercise> {
        self.store.get_translated_exercise(id, self.language.get())
    }

    fn translated_routine(&self, id: &RoutineID) -> Option<Routine> {
        self.store.get_translated_routine(id, self.language.get())
    }

    fn translated_folder(&self, id: &FolderID) -> Option<Folder> {
        self.store.get_translated_folder(id, self.language.get())
    }

    fn search_exercises(&self, query: &str, filter: &ExerciseFilter) -> Vec<Exercise> {
        self.store.search_exercises(query, filter, self.language.get())
    }

    /// Step sequence of a loaded routine.
    fn workout(&self, id: &RoutineID) -> Option<Workout> {
        self.store
            .get_resolved_routine(id)
            .map(|routine| Workout::new(&routine))
    }

    fn create_custom_routine(
        &self,
        name: &str,
        description: &str,
        exercise_ids: &[ExerciseID],
        durations: &[u32],
    ) -> Result<Routine, CreateError> {
        let result = self
            .store
            .create_custom_routine(name, description, exercise_ids, durations);
        if let Err(ref err) = result {
            debug!("failed to create custom routine: {err}");
        }
        result
    }

    fn save_custom_routine(&self, routine: &Routine) -> Result<(), CreateError> {
        let result = self.store.save_custom_routine(routine);
        if let Err(ref err) = result {
            error!("failed to save custom routine {}: {err}", routine.id);
        }
        result
    }

    fn delete_custom_routine(&self, id: &RoutineID) -> Result<(), StorageError> {
        let result = self.store.delete_custom_routine(id);
        if let Err(ref err) = result {
            error!("failed to delete custom routine {id}: {err}");
        }
        result
    }

    fn load_custom_routines(&self) -> Result<usize, StorageError> {
        let result = self.store.load_custom_routines();
        if let Err(ref err) = result {
            error!("failed to load custom routines: {err}");
        }
        result
    }
}

impl<R> TranslationService for Service<R> {
    fn language(&self) -> Language {
        self.language.get()
    }

    fn set_language(&self, language: Language) {
        debug!("switching language to {language}");
        self.language.set(language);
    }

    fn translate(&self, key: &str, params: &[(&str, &dyn Display)]) -> String {
        self.translations.resolve(key, self.language.get(), params)
    }
}
