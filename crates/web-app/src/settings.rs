use std::str::FromStr;

use bend_domain::{Language, StorageError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, StorageError>;
    async fn set_settings(&self, settings: Settings) -> Result<(), StorageError>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, StorageError>;
    async fn write_settings(&self, settings: Settings) -> Result<(), StorageError>;
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    #[serde(serialize_with = "serialize_language", deserialize_with = "deserialize_language")]
    pub language: Language,
    pub verbose_logging: bool,
}

fn serialize_language<S: Serializer>(
    language: &Language,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(language.as_ref())
}

/// Unknown language codes fall back to the default language.
fn deserialize_language<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Language, D::Error> {
    let code = String::deserialize(deserializer)?;
    Ok(Language::from_str(&code).unwrap_or_default())
}
