use std::collections::{BTreeMap, VecDeque};

use bend_domain as domain;
use bend_web_app::{Settings, SettingsRepository, log};
use gloo_storage::{Storage as GlooStorage, errors::StorageError};
use ::log::warn;

use crate::rest;

const KEY_SETTINGS: &str = "settings";
const KEY_CUSTOM_ROUTINES: &str = "bend-custom-routines";
const KEY_LOG: &str = "log";

#[derive(Clone, Copy, Default)]
pub struct LocalStorage;

impl SettingsRepository for LocalStorage {
    async fn read_settings(&self) -> Result<Settings, domain::StorageError> {
        match gloo_storage::LocalStorage::get(KEY_SETTINGS) {
            Ok(settings) => Ok(settings),
            Err(StorageError::KeyNotFound(_)) => Ok(Settings::default()),
            Err(StorageError::SerdeError(err)) => {
                warn!("failed to parse settings, using defaults: {err}");
                Ok(Settings::default())
            }
            Err(err) => Err(domain::StorageError::Other(err.to_string())),
        }
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), domain::StorageError> {
        gloo_storage::LocalStorage::set(KEY_SETTINGS, settings)
            .map_err(|err| domain::StorageError::Other(err.to_string()))
    }
}

impl domain::CustomRoutineRepository for LocalStorage {
    /// Unparsable data is treated as if no custom routines were stored.
    fn read_custom_routines(
        &self,
    ) -> Result<BTreeMap<domain::RoutineID, domain::Routine>, domain::StorageError> {
        let routines: BTreeMap<String, rest::Routine> =
            match gloo_storage::LocalStorage::get(KEY_CUSTOM_ROUTINES) {
                Ok(routines) => routines,
                Err(StorageError::KeyNotFound(_)) => BTreeMap::new(),
                Err(StorageError::SerdeError(err)) => {
                    warn!("failed to parse custom routines: {err}");
                    BTreeMap::new()
                }
                Err(err) => return Err(domain::StorageError::Other(err.to_string())),
            };
        Ok(routines
            .into_iter()
            .map(|(id, routine)| {
                let routine = domain::Routine {
                    id: id.clone().into(),
                    custom: true,
                    ..routine.into()
                };
                (id.into(), routine)
            })
            .collect())
    }

    fn write_custom_routines(
        &self,
        routines: &BTreeMap<domain::RoutineID, domain::Routine>,
    ) -> Result<(), domain::StorageError> {
        let routines = routines
            .iter()
            .map(|(id, routine)| (id.to_string(), rest::Routine::from(routine.clone())))
            .collect::<BTreeMap<_, _>>();
        gloo_storage::LocalStorage::set(KEY_CUSTOM_ROUTINES, routines)
            .map_err(|err| domain::StorageError::Other(err.to_string()))
    }
}

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        match gloo_storage::LocalStorage::get(KEY_LOG) {
            Ok(entries) => Ok(entries),
            Err(err) => match err {
                StorageError::KeyNotFound(_) => Ok(VecDeque::new()),
                err => Err(err),
            },
        }
        .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::append(&mut entries, entry);
        gloo_storage::LocalStorage::set(KEY_LOG, entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
