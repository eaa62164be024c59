//! Static content over HTTP
//!
//! Exercises, routines, folders, the content index and the translation bundles are plain JSON
//! files served next to the application.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    marker::PhantomData,
    str::FromStr,
};

use bend_domain as domain;
use gloo_net::http::{Request, Response};
use log::debug;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, SeqAccess, Visitor},
};

const DATA_PATH: &str = "./data";
const TRANSLATIONS_PATH: &str = "./translations";

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error>;
}

#[derive(Clone, Copy, Default)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
        request.send().await
    }
}

#[derive(Clone)]
pub struct REST<S: SendRequest> {
    pub sender: S,
}

impl REST<GlooNetSendRequest> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sender: GlooNetSendRequest,
        }
    }
}

impl Default for REST<GlooNetSendRequest> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SendRequest> REST<S> {
    async fn fetch<T>(
        &self,
        url: &str,
        kind: domain::EntityKind,
        id: &str,
    ) -> Result<T, domain::ReadError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = Request::get(url)
            .build()
            .map_err(|err| domain::StorageError::Other(err.to_string()))?;
        match self.sender.send_request(request).await {
            Ok(response) => {
                if response.ok() {
                    response.json::<T>().await.map_err(|err| {
                        domain::StorageError::Other(format!("deserialization failed: {err}"))
                            .into()
                    })
                } else if response.status() == 404 {
                    Err(domain::ReadError::not_found(kind, id))
                } else {
                    Err(domain::StorageError::Other(format!(
                        "{} {}",
                        response.status(),
                        response.status_text()
                    ))
                    .into())
                }
            }
            Err(_) => Err(domain::StorageError::NoConnection.into()),
        }
    }
}

impl<S: SendRequest> domain::ExerciseRepository for REST<S> {
    async fn read_exercise(
        &self,
        category: &str,
        id: &domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        let mut exercise: Exercise = self
            .fetch(
                &format!("{DATA_PATH}/exercises/{category}/{id}.json"),
                domain::EntityKind::Exercise,
                id,
            )
            .await?;
        if exercise.category.is_empty() {
            exercise.category = category.to_string();
        }
        Ok(exercise.into())
    }
}

impl<S: SendRequest> domain::RoutineRepository for REST<S> {
    async fn read_routine(
        &self,
        id: &domain::RoutineID,
    ) -> Result<domain::Routine, domain::ReadError> {
        let routine: Routine = self
            .fetch(
                &format!("{DATA_PATH}/routines/{id}.json"),
                domain::EntityKind::Routine,
                id,
            )
            .await?;
        Ok(routine.into())
    }
}

impl<S: SendRequest> domain::FolderRepository for REST<S> {
    async fn read_folder(
        &self,
        id: &domain::FolderID,
    ) -> Result<domain::Folder, domain::ReadError> {
        let folder: Folder = self
            .fetch(
                &format!("{DATA_PATH}/folders/{id}.json"),
                domain::EntityKind::Folder,
                id,
            )
            .await?;
        Ok(folder.into())
    }
}

impl<S: SendRequest> domain::ContentIndexRepository for REST<S> {
    async fn read_content_index(&self) -> Result<domain::ContentIndex, domain::ReadError> {
        let index: ContentIndex = self
            .fetch(
                &format!("{DATA_PATH}/index.json"),
                domain::EntityKind::Index,
                "index",
            )
            .await?;
        Ok(index.into())
    }
}

impl<S: SendRequest> domain::TranslationRepository for REST<S> {
    async fn read_bundle(
        &self,
        language: domain::Language,
    ) -> Result<domain::Node, domain::ReadError> {
        let bundle: serde_json::Value = self
            .fetch(
                &format!("{TRANSLATIONS_PATH}/{language}.json"),
                domain::EntityKind::Bundle,
                language.as_ref(),
            )
            .await?;
        Ok(node(bundle))
    }
}

/// Convert a JSON translation bundle into a translation tree.
///
/// Arrays become groups keyed by the index of their elements. Numbers and booleans become texts,
/// nulls are dropped.
#[must_use]
pub fn node(value: serde_json::Value) -> domain::Node {
    match value {
        serde_json::Value::Object(map) => domain::Node::Group(
            map.into_iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key, node(value)))
                .collect(),
        ),
        serde_json::Value::Array(values) => domain::Node::Group(
            values
                .into_iter()
                .enumerate()
                .filter(|(_, value)| !value.is_null())
                .map(|(i, value)| (i.to_string(), node(value)))
                .collect(),
        ),
        serde_json::Value::String(text) => domain::Node::Text(text),
        serde_json::Value::Null => domain::Node::group(),
        value @ (serde_json::Value::Bool(_) | serde_json::Value::Number(_)) => {
            domain::Node::Text(value.to_string())
        }
    }
}

fn translations<T, U: From<T>>(
    entity: &str,
    translations: BTreeMap<String, T>,
) -> BTreeMap<domain::Language, U> {
    translations
        .into_iter()
        .filter_map(|(code, text)| match domain::Language::from_str(&code) {
            Ok(language) => Some((language, U::from(text))),
            Err(_) => {
                debug!("ignoring translation of {entity} into unsupported language {code}");
                None
            }
        })
        .collect()
}

fn default_duration() -> u32 {
    domain::DEFAULT_DURATION
}

/// Accepts a single string or a list of strings.
fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        String(String),
        List(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::String(text) if text.is_empty() => vec![],
        StringOrList::String(text) => vec![text],
        StringOrList::List(list) => list,
    })
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub muscle_groups: BTreeSet<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default = "default_duration")]
    pub default_duration: u32,
    #[serde(default)]
    pub needs_side_switch: bool,
    #[serde(default)]
    pub translations: BTreeMap<String, ExerciseText>,
}

impl From<Exercise> for domain::Exercise {
    fn from(value: Exercise) -> Self {
        let translations = translations(&value.id, value.translations);
        domain::Exercise {
            id: value.id.into(),
            name: value.name,
            description: value.description,
            instructions: value.instructions,
            category: value.category,
            difficulty: value.difficulty,
            position: value.position,
            equipment: value.equipment,
            muscle_groups: value.muscle_groups,
            tags: value.tags,
            default_duration: value.default_duration,
            needs_side_switch: value.needs_side_switch,
            translations,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ExerciseText {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub instructions: Vec<String>,
}

impl From<ExerciseText> for domain::ExerciseText {
    fn from(value: ExerciseText) -> Self {
        domain::ExerciseText {
            name: value.name,
            description: value.description,
            instructions: value.instructions,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Text {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<Text> for domain::Text {
    fn from(value: Text) -> Self {
        domain::Text {
            name: value.name,
            description: value.description,
        }
    }
}

impl From<domain::Text> for Text {
    fn from(value: domain::Text) -> Self {
        Text {
            name: value.name,
            description: value.description,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_duration: u32,
    #[serde(default)]
    pub exercises: Vec<RoutineEntry>,
    #[serde(default)]
    pub translations: BTreeMap<String, Text>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub custom: bool,
}

impl From<Routine> for domain::Routine {
    fn from(value: Routine) -> Self {
        let translations = translations(&value.id, value.translations);
        domain::Routine {
            id: value.id.into(),
            name: value.name,
            description: value.description,
            target_duration: value.target_duration,
            exercises: value
                .exercises
                .into_iter()
                .map(domain::RoutineEntry::from)
                .collect(),
            translations,
            custom: value.custom,
        }
    }
}

impl From<domain::Routine> for Routine {
    fn from(value: domain::Routine) -> Self {
        Routine {
            id: value.id.to_string(),
            name: value.name,
            description: value.description,
            target_duration: value.target_duration,
            exercises: value.exercises.into_iter().map(RoutineEntry::from).collect(),
            translations: value
                .translations
                .into_iter()
                .map(|(language, text)| (language.to_string(), text.into()))
                .collect(),
            custom: value.custom,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineEntry {
    pub exercise_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_side_switch: Option<bool>,
}

impl From<RoutineEntry> for domain::RoutineEntry {
    fn from(value: RoutineEntry) -> Self {
        domain::RoutineEntry {
            exercise_id: value.exercise_id.into(),
            duration: value.duration,
            order: value.order,
            needs_side_switch: value.needs_side_switch,
        }
    }
}

impl From<domain::RoutineEntry> for RoutineEntry {
    fn from(value: domain::RoutineEntry) -> Self {
        RoutineEntry {
            exercise_id: value.exercise_id.to_string(),
            duration: value.duration,
            order: value.order,
            needs_side_switch: value.needs_side_switch,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub routines: FolderRoutines,
    #[serde(default)]
    pub translations: BTreeMap<String, Text>,
}

impl From<Folder> for domain::Folder {
    fn from(value: Folder) -> Self {
        let translations = translations(&value.id, value.translations);
        domain::Folder {
            id: value.id.into(),
            name: value.name,
            description: value.description,
            routines: value.routines.0.into_iter().map(domain::RoutineID::from).collect(),
            translations,
        }
    }
}

/// Routine ids of a folder in file order.
///
/// Given either as a list of ids or as an object mapping ids to whether they are contained.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderRoutines(pub Vec<String>);

impl<'de> Deserialize<'de> for FolderRoutines {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FolderRoutinesVisitor(PhantomData<FolderRoutines>);

        impl<'de> Visitor<'de> for FolderRoutinesVisitor {
            type Value = FolderRoutines;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a list of routine ids or a map of routine ids to booleans")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut ids = Vec::new();
                while let Some(id) = seq.next_element::<String>()? {
                    ids.push(id);
                }
                Ok(FolderRoutines(ids))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut ids = Vec::new();
                while let Some((id, contained)) = map.next_entry::<String, bool>()? {
                    if contained {
                        ids.push(id);
                    }
                }
                Ok(FolderRoutines(ids))
            }
        }

        deserializer.deserialize_any(FolderRoutinesVisitor(PhantomData))
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ContentIndex {
    #[serde(default)]
    pub exercises: Vec<IndexedExercise>,
    #[serde(default)]
    pub routines: Vec<String>,
    #[serde(default)]
    pub folders: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexedExercise {
    pub id: String,
    pub category: String,
}

impl From<ContentIndex> for domain::ContentIndex {
    fn from(value: ContentIndex) -> Self {
        domain::ContentIndex {
            exercises: value
                .exercises
                .into_iter()
                .map(|e| domain::IndexedExercise {
                    id: e.id.into(),
                    category: e.category,
                })
                .collect(),
            routines: value.routines.into_iter().map(domain::RoutineID::from).collect(),
            folders: value.folders.into_iter().map(domain::FolderID::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::tests::data::{NECK_TILT, NECK_TILT_JSON};

    #[test]
    fn test_exercise() {
        let exercise: Exercise = serde_json::from_value(NECK_TILT_JSON.clone()).unwrap();

        assert_eq!(domain::Exercise::from(exercise), NECK_TILT.clone());
    }

    #[test]
    fn test_exercise_defaults() {
        let exercise: Exercise = serde_json::from_value(json!({ "id": "plank" })).unwrap();
        let exercise = domain::Exercise::from(exercise);

        assert_eq!(exercise.default_duration, domain::DEFAULT_DURATION);
        assert!(!exercise.needs_side_switch);
        assert!(exercise.instructions.is_empty());
        assert!(exercise.translations.is_empty());
    }

    #[rstest]
    #[case::string(json!("Sit upright."), vec!["Sit upright."])]
    #[case::empty_string(json!(""), vec![])]
    #[case::list(json!(["Sit upright.", "Tilt slowly."]), vec!["Sit upright.", "Tilt slowly."])]
    fn test_exercise_text_instructions(
        #[case] instructions: serde_json::Value,
        #[case] expected: Vec<&str>,
    ) {
        let text: ExerciseText =
            serde_json::from_value(json!({ "instructions": instructions })).unwrap();

        assert_eq!(text.instructions, expected);
    }

    #[test]
    fn test_unsupported_translations_ignored() {
        let exercise: Exercise = serde_json::from_value(json!({
            "id": "plank",
            "translations": {
                "en": { "name": "Plank" },
                "fr": { "name": "Planche" }
            }
        }))
        .unwrap();

        assert_eq!(
            domain::Exercise::from(exercise)
                .translations
                .into_keys()
                .collect::<Vec<_>>(),
            vec![domain::Language::En]
        );
    }

    #[test]
    fn test_routine() {
        let routine: Routine = serde_json::from_value(json!({
            "id": "desk-break",
            "name": "desk break",
            "targetDuration": 60,
            "exercises": [
                { "exerciseId": "neck-tilt", "duration": 20, "order": 1, "needsSideSwitch": false },
                { "exerciseId": "cat-cow", "order": 2 }
            ],
            "translations": { "de": { "name": "Schreibtischpause" } }
        }))
        .unwrap();
        let routine = domain::Routine::from(routine);

        assert_eq!(
            routine.exercises,
            vec![
                domain::RoutineEntry {
                    exercise_id: "neck-tilt".into(),
                    duration: Some(20),
                    order: 1,
                    needs_side_switch: Some(false),
                },
                domain::RoutineEntry {
                    exercise_id: "cat-cow".into(),
                    duration: None,
                    order: 2,
                    needs_side_switch: None,
                },
            ]
        );
        assert_eq!(routine.text(domain::Language::De).name, "Schreibtischpause");
        assert!(!routine.custom);
    }

    #[test]
    fn test_routine_conversion_preserves_custom_routine() {
        let routine = domain::Routine::custom(
            "Mine",
            "",
            &["neck-tilt".into(), "plank".into()],
            &[20],
        )
        .unwrap();

        let json = serde_json::to_value(Routine::from(routine.clone())).unwrap();

        assert_eq!(
            domain::Routine::from(serde_json::from_value::<Routine>(json).unwrap()),
            routine
        );
    }

    #[rstest]
    #[case::list(r#"["morning-flow", "desk-break"]"#, &["morning-flow", "desk-break"])]
    #[case::map(
        r#"{"morning-flow": true, "hip-opener": false, "desk-break": true}"#,
        &["morning-flow", "desk-break"]
    )]
    #[case::empty("{}", &[])]
    fn test_folder_routines(#[case] routines: &str, #[case] expected: &[&str]) {
        let folder: Folder =
            serde_json::from_str(&format!(r#"{{"id": "daily", "routines": {routines}}}"#))
                .unwrap();

        assert_eq!(
            domain::Folder::from(folder)
                .routines
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn test_folder_routines_invalid() {
        assert!(
            serde_json::from_value::<Folder>(json!({ "id": "daily", "routines": "daily" }))
                .is_err()
        );
    }

    #[test]
    fn test_content_index() {
        let index: ContentIndex = serde_json::from_value(json!({
            "exercises": [{ "id": "plank", "category": "core" }],
            "routines": ["morning-flow"]
        }))
        .unwrap();
        let index = domain::ContentIndex::from(index);

        assert_eq!(
            index.exercises,
            vec![domain::IndexedExercise {
                id: "plank".into(),
                category: "core".to_string(),
            }]
        );
        assert_eq!(index.routines, vec![domain::RoutineID::from("morning-flow")]);
        assert!(index.folders.is_empty());
    }

    #[test]
    fn test_node() {
        assert_eq!(
            node(json!({
                "navigation": { "back": "Back" },
                "steps": ["One", "Two"],
                "count": 3,
                "enabled": true,
                "missing": null
            })),
            domain::Node::from_entries([
                ("navigation.back", "Back"),
                ("steps.0", "One"),
                ("steps.1", "Two"),
                ("count", "3"),
                ("enabled", "true"),
            ])
        );
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use std::cell::RefCell;

        use bend_domain::{
            ContentIndexRepository, ExerciseRepository, FolderRepository, RoutineRepository,
            TranslationRepository,
        };
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::wasm_bindgen_test;

        use super::*;
        use crate::tests::data::DAILY_JSON;

        #[wasm_bindgen_test]
        async fn test_read_exercise() {
            let rest = rest_with_response(Some(
                Response::builder().status(200).json(&*NECK_TILT_JSON),
            ));

            assert_eq!(
                rest.read_exercise("neck", &NECK_TILT.id).await.unwrap(),
                NECK_TILT.clone()
            );
            assert!(
                rest.sender
                    .request
                    .borrow()
                    .as_ref()
                    .is_some_and(|r| r.url().ends_with("/data/exercises/neck/neck-tilt.json"))
            );
        }

        #[wasm_bindgen_test]
        async fn test_read_exercise_category_from_bucket() {
            let rest = rest_with_response(Some(
                Response::builder()
                    .status(200)
                    .json(&json!({ "id": "plank" })),
            ));

            assert_eq!(
                rest.read_exercise("core", &"plank".into())
                    .await
                    .unwrap()
                    .category,
                "core"
            );
        }

        #[wasm_bindgen_test]
        async fn test_read_not_found() {
            let rest = rest_with_response(Some(
                Response::builder()
                    .status(404)
                    .body::<Option<&str>>(None),
            ));

            assert_eq!(
                rest.read_routine(&"unknown".into()).await,
                Err(domain::ReadError::not_found(
                    domain::EntityKind::Routine,
                    "unknown"
                ))
            );
        }

        #[wasm_bindgen_test]
        async fn test_read_no_connection() {
            let rest = rest_with_response(None);

            assert_eq!(
                rest.read_folder(&"daily".into()).await,
                Err(domain::ReadError::Storage(
                    domain::StorageError::NoConnection
                ))
            );
        }

        #[wasm_bindgen_test]
        async fn test_read_server_error() {
            let rest = rest_with_response(Some(
                Response::builder()
                    .status(500)
                    .body::<Option<&str>>(None),
            ));

            assert!(matches!(
                rest.read_content_index().await,
                Err(domain::ReadError::Storage(domain::StorageError::Other(_)))
            ));
        }

        #[wasm_bindgen_test]
        async fn test_read_invalid_json() {
            let rest = rest_with_response(Some(
                Response::builder().status(200).body(Some("<html></html>")),
            ));

            assert!(matches!(
                rest.read_folder(&"daily".into()).await,
                Err(domain::ReadError::Storage(domain::StorageError::Other(_)))
            ));
        }

        #[wasm_bindgen_test]
        async fn test_read_folder() {
            let rest = rest_with_response(Some(
                Response::builder().status(200).json(&*DAILY_JSON),
            ));

            assert_eq!(
                rest.read_folder(&"daily".into())
                    .await
                    .unwrap()
                    .routines
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
                vec!["morning-flow", "desk-break"]
            );
            assert!(
                rest.sender
                    .request
                    .borrow()
                    .as_ref()
                    .is_some_and(|r| r.url().ends_with("/data/folders/daily.json"))
            );
        }

        #[wasm_bindgen_test]
        async fn test_read_bundle() {
            let rest = rest_with_response(Some(
                Response::builder()
                    .status(200)
                    .json(&json!({ "navigation": { "back": "Zurück" } })),
            ));

            assert_eq!(
                rest.read_bundle(domain::Language::De)
                    .await
                    .unwrap()
                    .text("navigation.back"),
                Some("Zurück")
            );
            assert!(
                rest.sender
                    .request
                    .borrow()
                    .as_ref()
                    .is_some_and(|r| r.url().ends_with("/translations/de.json"))
            );
        }

        fn rest_with_response(
            response: Option<Result<Response, gloo_net::Error>>,
        ) -> REST<MockSendRequest> {
            REST {
                sender: MockSendRequest {
                    request: RefCell::new(None),
                    response: RefCell::new(response),
                },
            }
        }

        struct MockSendRequest {
            request: RefCell<Option<Request>>,
            response: RefCell<Option<Result<Response, gloo_net::Error>>>,
        }

        impl SendRequest for MockSendRequest {
            async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
                *self.request.borrow_mut() = Some(request);
                (*self.response.borrow_mut())
                    .take()
                    .unwrap_or(Err(gloo_net::Error::GlooError("no response".to_string())))
            }
        }
    }
}
