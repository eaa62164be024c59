use std::collections::{BTreeMap, BTreeSet};

use derive_more::{AsRef, Deref, Display};

use crate::{Language, ReadError, translation_for};

/// Category buckets searched in order when the category of an exercise is unknown.
pub const CATEGORIES: [&str; 9] = [
    "neck",
    "shoulders",
    "arms",
    "chest",
    "back",
    "core",
    "hips",
    "legs",
    "full-body",
];

pub const DEFAULT_DURATION: u32 = 30;

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercise(&self, category: &str, id: &ExerciseID) -> Result<Exercise, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: String,
    pub description: String,
    pub instructions: Vec<String>,
    pub category: String,
    pub difficulty: String,
    pub position: String,
    pub equipment: String,
    pub muscle_groups: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub default_duration: u32,
    pub needs_side_switch: bool,
    pub translations: BTreeMap<Language, ExerciseText>,
}

impl Exercise {
    /// Display fields in the given language, falling back to English and then to the
    /// untranslated fields of the record.
    #[must_use]
    pub fn text(&self, language: Language) -> ExerciseText {
        let untranslated = ExerciseText {
            name: self.name.clone(),
            description: self.description.clone(),
            instructions: self.instructions.clone(),
        };
        match translation_for(&self.translations, language) {
            Some(text) => text.clone().or(untranslated),
            None => untranslated,
        }
    }

    #[must_use]
    pub fn translated(&self, language: Language) -> Exercise {
        let text = self.text(language);
        Exercise {
            name: text.name,
            description: text.description,
            instructions: text.instructions,
            ..self.clone()
        }
    }
}

#[derive(AsRef, Deref, Display, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(String);

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExerciseText {
    pub name: String,
    pub description: String,
    pub instructions: Vec<String>,
}

impl ExerciseText {
    fn or(self, other: ExerciseText) -> ExerciseText {
        ExerciseText {
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
            instructions: if self.instructions.is_empty() {
                other.instructions
            } else {
                self.instructions
            },
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub position: Option<String>,
    pub equipment: Option<String>,
    pub muscle_groups: BTreeSet<String>,
    pub needs_side_switch: Option<bool>,
}

impl ExerciseFilter {
    /// Build a filter from key/value pairs. Unknown keys and unparsable values are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut filter = Self::default();
        for (key, value) in pairs {
            match key {
                "category" => filter.category = Some(value.to_string()),
                "difficulty" => filter.difficulty = Some(value.to_string()),
                "position" => filter.position = Some(value.to_string()),
                "equipment" => filter.equipment = Some(value.to_string()),
                "muscleGroups" | "muscle_groups" => filter.muscle_groups.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(str::to_string),
                ),
                "needsSideSwitch" | "needs_side_switch" => {
                    if let Ok(needs_side_switch) = value.parse() {
                        filter.needs_side_switch = Some(needs_side_switch);
                    }
                }
                _ => {}
            }
        }
        filter
    }

    #[must_use]
    pub fn matches(&self, exercise: &Exercise) -> bool {
        self.category.as_ref().is_none_or(|c| *c == exercise.category)
            && self
                .difficulty
                .as_ref()
                .is_none_or(|d| *d == exercise.difficulty)
            && self.position.as_ref().is_none_or(|p| *p == exercise.position)
            && self
                .equipment
                .as_ref()
                .is_none_or(|e| *e == exercise.equipment)
            && self.muscle_groups.is_subset(&exercise.muscle_groups)
            && self
                .needs_side_switch
                .is_none_or(|n| n == exercise.needs_side_switch)
    }

    /// Exercises matching both the query and the filter. The query is compared case-insensitively
    /// against the name and description in the given language and against the tags.
    #[must_use]
    pub fn exercises<'a>(
        &self,
        query: &str,
        language: Language,
        exercises: impl Iterator<Item = &'a Exercise>,
    ) -> Vec<&'a Exercise> {
        let query = query.trim().to_lowercase();
        exercises
            .filter(|e| self.matches(e) && matches_query(e, &query, language))
            .collect()
    }
}

fn matches_query(exercise: &Exercise, query: &str, language: Language) -> bool {
    if query.is_empty() {
        return true;
    }
    let text = exercise.text(language);
    text.name.to_lowercase().contains(query)
        || text.description.to_lowercase().contains(query)
        || exercise
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::tests::data::{CAT_COW, NECK_TILT, PLANK, exercise};

    #[test]
    fn test_exercise_text() {
        assert_eq!(NECK_TILT.text(Language::De).name, "Nackenneigung");
        assert_eq!(NECK_TILT.text(Language::Es).name, "Neck Tilt");
        assert_eq!(
            NECK_TILT.text(Language::Es).description,
            "Tilt your head towards your shoulder."
        );
    }

    #[test]
    fn test_exercise_text_untranslated() {
        let mut exercise = NECK_TILT.clone();
        exercise.translations.clear();
        assert_eq!(
            exercise.text(Language::Ta),
            ExerciseText {
                name: "neck tilt".to_string(),
                description: String::new(),
                instructions: vec![],
            }
        );
    }

    #[test]
    fn test_exercise_text_partial_translation() {
        let mut exercise = NECK_TILT.clone();
        exercise.translations.insert(
            Language::Ta,
            ExerciseText {
                name: "கழுத்து சாய்வு".to_string(),
                ..ExerciseText::default()
            },
        );
        let text = exercise.text(Language::Ta);
        assert_eq!(text.name, "கழுத்து சாய்வு");
        assert_eq!(text.description, "");
    }

    #[test]
    fn test_exercise_translated() {
        let translated = NECK_TILT.translated(Language::De);
        assert_eq!(translated.name, "Nackenneigung");
        assert_eq!(translated.id, NECK_TILT.id);
        assert_eq!(translated.translations, NECK_TILT.translations);
    }

    #[rstest]
    #[case::empty(&[], ExerciseFilter::default())]
    #[case::category(
        &[("category", "core")],
        ExerciseFilter { category: Some("core".into()), ..ExerciseFilter::default() }
    )]
    #[case::muscle_groups(
        &[("muscleGroups", "neck, traps")],
        ExerciseFilter {
            muscle_groups: ["neck".to_string(), "traps".to_string()].into(),
            ..ExerciseFilter::default()
        }
    )]
    #[case::needs_side_switch(
        &[("needsSideSwitch", "false")],
        ExerciseFilter { needs_side_switch: Some(false), ..ExerciseFilter::default() }
    )]
    #[case::invalid_bool(&[("needsSideSwitch", "maybe")], ExerciseFilter::default())]
    #[case::unknown_key(&[("color", "red")], ExerciseFilter::default())]
    fn test_exercise_filter_from_pairs(
        #[case] pairs: &[(&str, &str)],
        #[case] expected: ExerciseFilter,
    ) {
        assert_eq!(ExerciseFilter::from_pairs(pairs.iter().copied()), expected);
    }

    #[rstest]
    #[case::empty(&[], true)]
    #[case::category(&[("category", "neck")], true)]
    #[case::other_category(&[("category", "core")], false)]
    #[case::difficulty(&[("difficulty", "beginner")], true)]
    #[case::position(&[("position", "lying")], false)]
    #[case::equipment(&[("equipment", "none")], true)]
    #[case::muscle_group(&[("muscleGroups", "neck")], true)]
    #[case::missing_muscle_group(&[("muscleGroups", "neck,abs")], false)]
    #[case::needs_side_switch(&[("needsSideSwitch", "true")], true)]
    #[case::no_side_switch(&[("needsSideSwitch", "false")], false)]
    fn test_exercise_filter_matches(#[case] pairs: &[(&str, &str)], #[case] expected: bool) {
        let filter = ExerciseFilter::from_pairs(pairs.iter().copied());
        assert_eq!(filter.matches(&NECK_TILT), expected);
    }

    #[rstest]
    #[case::empty_query("", ExerciseFilter::default(), &["cat-cow", "neck-tilt", "plank"])]
    #[case::name("neck", ExerciseFilter::default(), &["neck-tilt"])]
    #[case::upper_case("NECK", ExerciseFilter::default(), &["neck-tilt"])]
    #[case::description("spine", ExerciseFilter::default(), &["cat-cow"])]
    #[case::tag("desk", ExerciseFilter::default(), &["neck-tilt"])]
    #[case::category("", ExerciseFilter::from_pairs([("category", "core")]), &["plank"])]
    #[case::query_and_filter("neck", ExerciseFilter::from_pairs([("category", "core")]), &[])]
    fn test_exercise_filter_exercises(
        #[case] query: &str,
        #[case] filter: ExerciseFilter,
        #[case] expected: &[&str],
    ) {
        let exercises = [CAT_COW.clone(), NECK_TILT.clone(), PLANK.clone()];
        assert_eq!(
            filter
                .exercises(query, Language::En, exercises.iter())
                .into_iter()
                .map(|e| e.id.to_string())
                .collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn test_exercise_filter_exercises_translated_name() {
        let exercises = [NECK_TILT.clone(), exercise("shoulder-roll", "shoulders")];
        assert_eq!(
            ExerciseFilter::default()
                .exercises("nacken", Language::De, exercises.iter())
                .len(),
            1
        );
        assert!(
            ExerciseFilter::default()
                .exercises("nacken", Language::En, exercises.iter())
                .is_empty()
        );
    }
}
