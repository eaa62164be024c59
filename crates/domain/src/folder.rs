use std::collections::BTreeMap;

use derive_more::{AsRef, Deref, Display};

use crate::{Language, ReadError, ResolvedRoutine, RoutineID, Text, translation_for};

#[allow(async_fn_in_trait)]
pub trait FolderRepository {
    async fn read_folder(&self, id: &FolderID) -> Result<Folder, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: FolderID,
    pub name: String,
    pub description: String,
    pub routines: Vec<RoutineID>,
    pub translations: BTreeMap<Language, Text>,
}

impl Folder {
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
    pub fn translated(&self, language: Language) -> Folder {
        let text = self.text(language);
        Folder {
            name: text.name,
            description: text.description,
            ..self.clone()
        }
    }
}

#[derive(AsRef, Deref, Display, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FolderID(String);

impl From<&str> for FolderID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FolderID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFolder {
    pub folder: Folder,
    pub loaded_routines: Vec<ResolvedRoutine>,
}
