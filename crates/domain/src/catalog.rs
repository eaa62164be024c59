use crate::{ExerciseID, FolderID, ReadError, RoutineID};

#[allow(async_fn_in_trait)]
pub trait ContentIndexRepository {
    async fn read_content_index(&self) -> Result<ContentIndex, ReadError>;
}

/// Enumeration of all shipped content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIndex {
    pub exercises: Vec<IndexedExercise>,
    pub routines: Vec<RoutineID>,
    pub folders: Vec<FolderID>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedExercise {
    pub id: ExerciseID,
    pub category: String,
}

impl ContentIndex {
    /// Content bundled with the application, used when no index file is available.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            exercises: EXERCISES
                .iter()
                .map(|(category, id)| IndexedExercise {
                    id: (*id).into(),
                    category: (*category).to_string(),
                })
                .collect(),
            routines: ROUTINES.iter().map(|id| (*id).into()).collect(),
            folders: FOLDERS.iter().map(|id| (*id).into()).collect(),
        }
    }
}

static EXERCISES: &[(&str, &str)] = &[
    ("neck", "neck-tilt"),
    ("neck", "neck-rotation"),
    ("neck", "chin-tuck"),
    ("shoulders", "shoulder-rolls"),
    ("shoulders", "cross-body-shoulder-stretch"),
    ("shoulders", "doorway-chest-opener"),
    ("arms", "wrist-flexor-stretch"),
    ("arms", "triceps-stretch"),
    ("chest", "clasped-hands-chest-stretch"),
    ("back", "cat-cow"),
    ("back", "childs-pose"),
    ("back", "seated-spinal-twist"),
    ("core", "cobra"),
    ("core", "plank"),
    ("hips", "hip-flexor-lunge"),
    ("hips", "pigeon-pose"),
    ("hips", "butterfly"),
    ("legs", "standing-quad-stretch"),
    ("legs", "seated-forward-fold"),
    ("legs", "calf-stretch"),
    ("full-body", "downward-dog"),
    ("full-body", "sun-salutation"),
];

static ROUTINES: &[&str] = &[
    "morning-flow",
    "desk-break",
    "evening-wind-down",
    "hip-opener",
    "full-body-stretch",
];

static FOLDERS: &[&str] = &["daily", "office", "recovery"];

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::CATEGORIES;

    #[test]
    fn test_builtin_categories_known() {
        for exercise in ContentIndex::builtin().exercises {
            assert!(
                CATEGORIES.contains(&exercise.category.as_str()),
                "{}",
                exercise.category
            );
        }
    }

    #[test]
    fn test_builtin_ids_unique() {
        let index = ContentIndex::builtin();
        assert_eq!(
            index.exercises.iter().map(|e| &e.id).collect::<BTreeSet<_>>().len(),
            index.exercises.len()
        );
        assert_eq!(
            index.routines.iter().collect::<BTreeSet<_>>().len(),
            index.routines.len()
        );
        assert_eq!(
            index.folders.iter().collect::<BTreeSet<_>>().len(),
            index.folders.len()
        );
    }
}
