//! Content store
//!
//! Exercises, routines and folders are loaded on demand and cached until the cache is cleared.
//! At most one load per entity kind and id is in flight: concurrent callers await the same
//! shared result. A failed load is not cached, so the next call retries.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use futures_util::future::{FutureExt, LocalBoxFuture, Shared, try_join_all};
use log::debug;

use crate::{
    CATEGORIES, CreateError, CustomRoutineRepository, EntityKind, Exercise, ExerciseFilter,
    ExerciseID, ExerciseRepository, Folder, FolderID, FolderRepository, Language, Name, ReadError,
    ResolvedFolder, ResolvedRoutine, Routine, RoutineID, RoutineRepository, StorageError,
};

type Pending<T> = Shared<LocalBoxFuture<'static, Result<T, ReadError>>>;

#[derive(Default)]
struct Cache {
    generation: u64,
    exercises: BTreeMap<ExerciseID, Exercise>,
    routines: BTreeMap<RoutineID, Routine>,
    resolved_routines: BTreeMap<RoutineID, ResolvedRoutine>,
    folders: BTreeMap<FolderID, ResolvedFolder>,
    pending_exercises: HashMap<ExerciseID, Pending<Exercise>>,
    pending_routines: HashMap<RoutineID, Pending<ResolvedRoutine>>,
    pending_folders: HashMap<FolderID, Pending<ResolvedFolder>>,
}

macro_rules! load_once {
    ($self: ident, $id: ident, $loaded: ident, $pending: ident, $fetch: ident) => {{
        let load = {
            let mut cache = $self.cache.borrow_mut();
            if let Some(loaded) = cache.$loaded.get($id) {
                return Ok(loaded.clone());
            }
            if let Some(pending) = cache.$pending.get($id) {
                pending.clone()
            } else {
                let generation = cache.generation;
                let store = $self.clone();
                let id = $id.clone();
                let load = async move {
                    let result = store.$fetch(&id).await;
                    let mut cache = store.cache.borrow_mut();
                    // A load started before the cache was cleared must not repopulate it.
                    if cache.generation == generation {
                        cache.$pending.remove(&id);
                        if let Ok(ref loaded) = result {
                            cache.$loaded.insert(id, loaded.clone());
                        }
                    }
                    result
                }
                .boxed_local()
                .shared();
                cache.$pending.insert($id.clone(), load.clone());
                load
            }
        };
        load.await
    }};
}

pub struct ContentStore<R> {
    repository: Rc<R>,
    cache: Rc<RefCell<Cache>>,
}

impl<R> Clone for ContentStore<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Rc::clone(&self.repository),
            cache: Rc::clone(&self.cache),
        }
    }
}

impl<R> ContentStore<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Rc::new(repository),
            cache: Rc::new(RefCell::new(Cache::default())),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Drop all cached records and forget all loads in flight.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.borrow_mut();
        let generation = cache.generation.wrapping_add(1);
        *cache = Cache {
            generation,
            ..Cache::default()
        };
    }

    #[must_use]
    pub fn get_exercise(&self, id: &ExerciseID) -> Option<Exercise> {
        self.cache.borrow().exercises.get(id).cloned()
    }

    #[must_use]
    pub fn get_routine(&self, id: &RoutineID) -> Option<Routine> {
        let cache = self.cache.borrow();
        cache
            .resolved_routines
            .get(id)
            .map(|r| r.routine.clone())
            .or_else(|| cache.routines.get(id).cloned())
    }

    #[must_use]
    pub fn get_resolved_routine(&self, id: &RoutineID) -> Option<ResolvedRoutine> {
        self.cache.borrow().resolved_routines.get(id).cloned()
    }

    #[must_use]
    pub fn get_folder(&self, id: &FolderID) -> Option<ResolvedFolder> {
        self.cache.borrow().folders.get(id).cloned()
    }

    #[must_use]
    pub fn get_translated_exercise(&self, id: &ExerciseID, language: Language) -> Option<Exercise> {
        self.cache
            .borrow()
            .exercises
            .get(id)
            .map(|e| e.translated(language))
    }

    #[must_use]
    pub fn get_translated_routine(&self, id: &RoutineID, language: Language) -> Option<Routine> {
        self.get_routine(id).map(|r| r.translated(language))
    }

    #[must_use]
    pub fn get_translated_folder(&self, id: &FolderID, language: Language) -> Option<Folder> {
        self.cache
            .borrow()
            .folders
            .get(id)
            .map(|f| f.folder.translated(language))
    }

    #[must_use]
    pub fn exercises(&self) -> Vec<Exercise> {
        self.cache.borrow().exercises.values().cloned().collect()
    }

    #[must_use]
    pub fn routines(&self) -> Vec<Routine> {
        let cache = self.cache.borrow();
        let mut routines = cache.routines.clone();
        routines.extend(
            cache
                .resolved_routines
                .iter()
                .map(|(id, r)| (id.clone(), r.routine.clone())),
        );
        routines.into_values().collect()
    }

    #[must_use]
    pub fn folders(&self) -> Vec<Folder> {
        self.cache
            .borrow()
            .folders
            .values()
            .map(|f| f.folder.clone())
            .collect()
    }

    /// Cached exercises matching the query and the filter, ordered by id.
    #[must_use]
    pub fn search_exercises(
        &self,
        query: &str,
        filter: &ExerciseFilter,
        language: Language,
    ) -> Vec<Exercise> {
        let cache = self.cache.borrow();
        filter
            .exercises(query, language, cache.exercises.values())
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn create_custom_routine(
        &self,
        name: &str,
        description: &str,
        exercise_ids: &[ExerciseID],
        durations: &[u32],
    ) -> Result<Routine, CreateError> {
        let routine = Routine::custom(name, description, exercise_ids, durations)?;
        self.cache
            .borrow_mut()
            .routines
            .insert(routine.id.clone(), routine.clone());
        Ok(routine)
    }
}

impl<R: CustomRoutineRepository> ContentStore<R> {
    /// Persist a custom routine. The name is validated before anything is written.
    pub fn save_custom_routine(&self, routine: &Routine) -> Result<(), CreateError> {
        Name::new(&routine.name)?;
        let mut routines = self.repository.read_custom_routines()?;
        routines.insert(routine.id.clone(), routine.clone());
        self.repository.write_custom_routines(&routines)?;

        let mut cache = self.cache.borrow_mut();
        cache.resolved_routines.remove(&routine.id);
        cache.routines.insert(routine.id.clone(), routine.clone());
        Ok(())
    }

    pub fn get_custom_routines(&self) -> Result<BTreeMap<RoutineID, Routine>, StorageError> {
        self.repository.read_custom_routines()
    }

    /// Merge all persisted custom routines into the cache and return their number.
    pub fn load_custom_routines(&self) -> Result<usize, StorageError> {
        let routines = self.repository.read_custom_routines()?;
        let count = routines.len();
        let mut cache = self.cache.borrow_mut();
        for (id, mut routine) in routines {
            routine.custom = true;
            cache.resolved_routines.remove(&id);
            cache.routines.insert(id, routine);
        }
        debug!("loaded {count} custom routines");
        Ok(count)
    }

    pub fn delete_custom_routine(&self, id: &RoutineID) -> Result<(), StorageError> {
        let mut routines = self.repository.read_custom_routines()?;
        if routines.remove(id).is_some() {
            self.repository.write_custom_routines(&routines)?;
        }

        let mut cache = self.cache.borrow_mut();
        cache.routines.remove(id);
        cache.resolved_routines.remove(id);
        Ok(())
    }
}

impl<R> ContentStore<R>
where
    R: ExerciseRepository + RoutineRepository + FolderRepository + 'static,
{
    pub async fn load_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError> {
        load_once!(self, id, exercises, pending_exercises, fetch_exercise)
    }

    /// Load a routine and all exercises it references.
    ///
    /// The resolved entries are sorted by their order. Durations and side switches set on an
    /// entry take precedence over the defaults of the exercise.
    pub async fn load_routine(&self, id: &RoutineID) -> Result<ResolvedRoutine, ReadError> {
        load_once!(self, id, resolved_routines, pending_routines, fetch_routine)
    }

    pub async fn load_folder(&self, id: &FolderID) -> Result<ResolvedFolder, ReadError> {
        load_once!(self, id, folders, pending_folders, fetch_folder)
    }

    async fn fetch_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError> {
        for category in CATEGORIES {
            match self.repository.read_exercise(category, id).await {
                Ok(exercise) => return Ok(exercise),
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        debug!("exercise {id} not found in any category");
        Err(ReadError::not_found(EntityKind::Exercise, id))
    }

    async fn fetch_routine(&self, id: &RoutineID) -> Result<ResolvedRoutine, ReadError> {
        let custom = self.cache.borrow().routines.get(id).cloned();
        let routine = match custom {
            Some(routine) => routine,
            None => self.repository.read_routine(id).await?,
        };
        let exercises = try_join_all(
            routine
                .ordered_entries()
                .into_iter()
                .map(|entry| self.load_exercise(&entry.exercise_id)),
        )
        .await?;
        Ok(ResolvedRoutine::new(routine, exercises))
    }

    async fn fetch_folder(&self, id: &FolderID) -> Result<ResolvedFolder, ReadError> {
        let folder = self.repository.read_folder(id).await?;
        let loaded_routines =
            try_join_all(folder.routines.iter().map(|id| self.load_routine(id))).await?;
        Ok(ResolvedFolder {
            folder,
            loaded_routines,
        })
    }
}
