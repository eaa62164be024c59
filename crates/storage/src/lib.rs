#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use bend_domain::{
    self as domain, ContentIndexRepository, ContentService, CustomRoutineRepository,
    ExerciseRepository, FolderRepository, RoutineRepository, TranslationRepository,
    TranslationService,
};
use bend_web_app::{self as web_app, SettingsService};
use log::{debug, info, warn};

pub mod local_storage;
pub mod rest;

use local_storage::LocalStorage;
use rest::{GlooNetSendRequest, REST, SendRequest};

/// Content fetched over HTTP and custom routines kept in local storage.
#[derive(Clone)]
pub struct Storage<S: SendRequest> {
    pub rest: REST<S>,
    pub local_storage: LocalStorage,
}

impl Storage<GlooNetSendRequest> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rest: REST::new(),
            local_storage: LocalStorage,
        }
    }
}

impl Default for Storage<GlooNetSendRequest> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SendRequest> ExerciseRepository for Storage<S> {
    async fn read_exercise(
        &self,
        category: &str,
        id: &domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        self.rest.read_exercise(category, id).await
    }
}

impl<S: SendRequest> RoutineRepository for Storage<S> {
    async fn read_routine(
        &self,
        id: &domain::RoutineID,
    ) -> Result<domain::Routine, domain::ReadError> {
        self.rest.read_routine(id).await
    }
}

impl<S: SendRequest> FolderRepository for Storage<S> {
    async fn read_folder(
        &self,
        id: &domain::FolderID,
    ) -> Result<domain::Folder, domain::ReadError> {
        self.rest.read_folder(id).await
    }
}

impl<S: SendRequest> ContentIndexRepository for Storage<S> {
    async fn read_content_index(&self) -> Result<domain::ContentIndex, domain::ReadError> {
        self.rest.read_content_index().await
    }
}

impl<S: SendRequest> TranslationRepository for Storage<S> {
    async fn read_bundle(
        &self,
        language: domain::Language,
    ) -> Result<domain::Node, domain::ReadError> {
        self.rest.read_bundle(language).await
    }
}

impl<S: SendRequest> CustomRoutineRepository for Storage<S> {
    fn read_custom_routines(
        &self,
    ) -> Result<BTreeMap<domain::RoutineID, domain::Routine>, domain::StorageError> {
        self.local_storage.read_custom_routines()
    }

    fn write_custom_routines(
        &self,
        routines: &BTreeMap<domain::RoutineID, domain::Routine>,
    ) -> Result<(), domain::StorageError> {
        self.local_storage.write_custom_routines(routines)
    }
}

/// Services of a running application.
pub struct App {
    pub domain: domain::Service<Storage<GlooNetSendRequest>>,
    pub web_app: web_app::Service<LocalStorage>,
}

impl App {
    /// Install the logger, apply the stored settings, restore the custom routines and load the
    /// translations.
    pub async fn start() -> Self {
        let web_app = web_app::Service::new(LocalStorage);
        let settings = web_app.get_settings().await;

        if let Err(err) = web_app::log::init(
            Arc::new(Mutex::new(LocalStorage)),
            settings.as_ref().is_ok_and(|s| s.verbose_logging),
        ) {
            debug!("logger already initialized: {err}");
        }

        let settings = settings.unwrap_or_else(|err| {
            warn!("failed to read settings: {err}");
            web_app::Settings::default()
        });
        info!("starting with language {}", settings.language);

        let domain = domain::Service::new(Storage::new(), settings.language);
        // Failures are logged by the service; the app starts without custom routines.
        if let Ok(count) = domain.load_custom_routines() {
            debug!("restored {count} custom routines");
        }
        domain.load_translations().await;

        Self { domain, web_app }
    }

    /// Switch the language and remember it for the next start.
    pub async fn set_language(
        &self,
        language: domain::Language,
    ) -> Result<(), domain::StorageError> {
        self.domain.set_language(language);
        let settings = self.web_app.get_settings().await?;
        self.web_app
            .set_settings(web_app::Settings {
                language,
                ..settings
            })
            .await
    }

    pub async fn set_verbose_logging(&self, verbose: bool) -> Result<(), domain::StorageError> {
        let settings = self.web_app.get_settings().await?;
        self.web_app
            .set_settings(web_app::Settings {
                verbose_logging: verbose,
                ..settings
            })
            .await
    }
}
