//! Translation resolver
//!
//! Each supported language has a tree of display strings. The tree consists of the bundle of the
//! language and the translations of all shipped exercises, routines and folders, which are merged
//! under `exercises.<id>`, `routines.<id>` and `folders.<id>`.

use std::{
    cell::RefCell,
    collections::{BTreeMap, btree_map::Entry},
    fmt::Display,
    iter::zip,
    sync::LazyLock,
};

use futures_util::future::join_all;
use log::{debug, warn};
use regex::{Captures, Regex};

use crate::{
    ContentIndex, ContentIndexRepository, ExerciseRepository, ExerciseText, FolderRepository,
    Language, ReadError, RoutineRepository, Text,
};

#[allow(async_fn_in_trait)]
pub trait TranslationRepository {
    async fn read_bundle(&self, language: Language) -> Result<Node, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Group(BTreeMap<String, Node>),
}

impl Node {
    #[must_use]
    pub fn group() -> Self {
        Node::Group(BTreeMap::new())
    }

    /// Build a tree from dotted keys and their texts.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut node = Node::group();
        for (key, text) in entries {
            node.merge_at(
                &key.split('.').collect::<Vec<_>>(),
                Node::Text(text.to_string()),
            );
        }
        node
    }

    /// Walk the tree along a dotted key. The walk stops at the first missing segment.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        key.split('.').try_fold(self, |node, segment| match node {
            Node::Group(children) => children.get(segment),
            Node::Text(_) => None,
        })
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Node::Text(text) => Some(text),
            Node::Group(_) => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Text(text) => text.is_empty(),
            Node::Group(children) => children.is_empty(),
        }
    }

    /// Merge `other` into this node. Texts of `other` replace existing entries, groups are merged
    /// recursively.
    pub fn merge(&mut self, other: Node) {
        match other {
            Node::Group(others) => {
                let children = self.children_mut();
                for (key, node) in others {
                    match children.entry(key) {
                        Entry::Occupied(mut entry) => entry.get_mut().merge(node),
                        Entry::Vacant(entry) => {
                            entry.insert(node);
                        }
                    }
                }
            }
            text @ Node::Text(_) => *self = text,
        }
    }

    /// Merge `other` into the node at `path`, creating missing groups on the way.
    pub fn merge_at(&mut self, path: &[&str], other: Node) {
        let mut current = self;
        for segment in path {
            current = current
                .children_mut()
                .entry((*segment).to_string())
                .or_insert_with(Node::group);
        }
        current.merge(other);
    }

    fn children_mut(&mut self) -> &mut BTreeMap<String, Node> {
        if let Node::Text(_) = self {
            *self = Node::group();
        }
        match self {
            Node::Group(children) => children,
            Node::Text(_) => unreachable!("text replaced by group"),
        }
    }
}

impl From<&Text> for Node {
    fn from(value: &Text) -> Self {
        Node::from_entries(
            [("name", &value.name), ("description", &value.description)]
                .into_iter()
                .filter(|(_, text)| !text.is_empty())
                .map(|(key, text)| (key, text.as_str())),
        )
    }
}

impl From<&ExerciseText> for Node {
    fn from(value: &ExerciseText) -> Self {
        let mut node = Node::from(&Text {
            name: value.name.clone(),
            description: value.description.clone(),
        });
        if !value.instructions.is_empty() {
            node.merge_at(
                &["instructions"],
                Node::Group(
                    value
                        .instructions
                        .iter()
                        .enumerate()
                        .map(|(i, instruction)| (i.to_string(), Node::Text(instruction.clone())))
                        .collect(),
                ),
            );
        }
        node
    }
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("invalid placeholder pattern"));

/// Replace `{{name}}` placeholders by the value of the parameter with the same name.
///
/// Placeholders without a parameter are kept. Substituted values are not scanned again.
#[must_use]
pub fn interpolate(text: &str, params: &[(&str, &dyn Display)]) -> String {
    PLACEHOLDER
        .replace_all(text, |captures: &Captures| {
            match params.iter().find(|(name, _)| *name == &captures[1]) {
                Some((_, value)) => value.to_string(),
                None => captures[0].to_string(),
            }
        })
        .into_owned()
}

/// Minimal bundle used when the bundle of a language cannot be loaded.
#[must_use]
pub fn fallback_bundle(language: Language) -> Node {
    let entries: &[(&str, &str)] = match language {
        Language::En => &[
            ("app.title", "Bend"),
            ("app.subtitle", "Stretching & Flexibility"),
            ("navigation.back", "Back"),
            ("navigation.next", "Next"),
            ("navigation.start", "Start"),
            ("timer.switchSides", "Switch sides"),
            ("timer.progress", "{{current}} of {{total}}"),
        ],
        Language::De => &[
            ("app.title", "Bend"),
            ("app.subtitle", "Dehnung & Beweglichkeit"),
            ("navigation.back", "Zurück"),
            ("navigation.next", "Weiter"),
            ("navigation.start", "Starten"),
            ("timer.switchSides", "Seite wechseln"),
            ("timer.progress", "{{current}} von {{total}}"),
        ],
        Language::Es => &[
            ("app.title", "Bend"),
            ("app.subtitle", "Estiramiento y flexibilidad"),
            ("navigation.back", "Atrás"),
            ("navigation.next", "Siguiente"),
            ("navigation.start", "Comenzar"),
            ("timer.switchSides", "Cambia de lado"),
            ("timer.progress", "{{current}} de {{total}}"),
        ],
        Language::Ta => &[
            ("app.title", "Bend"),
            ("app.subtitle", "நீட்சி & நெகிழ்வு"),
            ("navigation.back", "பின்செல்"),
            ("navigation.next", "அடுத்து"),
            ("navigation.start", "தொடங்கு"),
            ("timer.switchSides", "பக்கம் மாற்றவும்"),
            ("timer.progress", "{{current}} / {{total}}"),
        ],
    };
    Node::from_entries(entries.iter().copied())
}

pub struct TranslationResolver<R> {
    repository: R,
    trees: RefCell<Option<BTreeMap<Language, Node>>>,
}

impl<R> TranslationResolver<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            trees: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.trees.borrow().is_some()
    }

    /// Text for a dotted key in the given language.
    ///
    /// Falls back to the default language and finally to the key itself. Before the
    /// translations are loaded the key is returned.
    #[must_use]
    pub fn resolve(
        &self,
        key: &str,
        language: Language,
        params: &[(&str, &dyn Display)],
    ) -> String {
        let trees = self.trees.borrow();
        let Some(trees) = trees.as_ref() else {
            return key.to_string();
        };
        let text = [language, Language::DEFAULT]
            .into_iter()
            .find_map(|l| trees.get(&l)?.text(key));
        if let Some(text) = text {
            interpolate(text, params)
        } else {
            debug!("missing translation for {key}");
            key.to_string()
        }
    }

    /// Whether the key exists in the given language without falling back.
    #[must_use]
    pub fn has(&self, key: &str, language: Language) -> bool {
        self.trees
            .borrow()
            .as_ref()
            .and_then(|trees| trees.get(&language)?.text(key))
            .is_some()
    }
}

impl<R> TranslationResolver<R>
where
    R: TranslationRepository
        + ContentIndexRepository
        + ExerciseRepository
        + RoutineRepository
        + FolderRepository,
{
    /// Load the bundles of all supported languages and merge the translations of all content
    /// records into them.
    ///
    /// Missing bundles are replaced by a built-in fallback bundle, missing content records are
    /// skipped.
    pub async fn load(&self) {
        let index = match self.repository.read_content_index().await {
            Ok(index) => index,
            Err(err) => {
                debug!("failed to read content index, using built-in index: {err}");
                ContentIndex::builtin()
            }
        };

        let mut trees = BTreeMap::new();
        let bundles = join_all(Language::iter().map(|l| self.repository.read_bundle(l))).await;
        for (language, bundle) in zip(Language::iter(), bundles) {
            let tree = match bundle {
                Ok(bundle @ Node::Group(_)) if !bundle.is_empty() => bundle,
                Ok(_) => {
                    warn!("translations for {language} are empty, using fallback");
                    fallback_bundle(language)
                }
                Err(err) => {
                    warn!("failed to load translations for {language}, using fallback: {err}");
                    fallback_bundle(language)
                }
            };
            trees.insert(language, tree);
        }

        let exercises = join_all(
            index
                .exercises
                .iter()
                .map(|e| self.repository.read_exercise(&e.category, &e.id)),
        )
        .await;
        for (indexed, exercise) in zip(&index.exercises, exercises) {
            match exercise {
                Ok(exercise) => {
                    for (language, text) in &exercise.translations {
                        let fragment = text.into();
                        merge_fragment(&mut trees, *language, "exercises", &indexed.id, fragment);
                    }
                }
                Err(err) => debug!("skipping translations of exercise {}: {err}", indexed.id),
            }
        }

        let routines =
            join_all(index.routines.iter().map(|id| self.repository.read_routine(id))).await;
        for (id, routine) in zip(&index.routines, routines) {
            match routine {
                Ok(routine) => {
                    for (language, text) in &routine.translations {
                        merge_fragment(&mut trees, *language, "routines", id, text.into());
                    }
                }
                Err(err) => debug!("skipping translations of routine {id}: {err}"),
            }
        }

        let folders =
            join_all(index.folders.iter().map(|id| self.repository.read_folder(id))).await;
        for (id, folder) in zip(&index.folders, folders) {
            match folder {
                Ok(folder) => {
                    for (language, text) in &folder.translations {
                        merge_fragment(&mut trees, *language, "folders", id, text.into());
                    }
                }
                Err(err) => debug!("skipping translations of folder {id}: {err}"),
            }
        }

        *self.trees.borrow_mut() = Some(trees);
    }
}

fn merge_fragment(
    trees: &mut BTreeMap<Language, Node>,
    language: Language,
    section: &str,
    id: &str,
    fragment: Node,
) {
    if fragment.is_empty() {
        return;
    }
    trees
        .entry(language)
        .or_insert_with(|| fallback_bundle(language))
        .merge_at(&[section, id], fragment);
}
