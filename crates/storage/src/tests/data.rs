use std::{collections::BTreeMap, sync::LazyLock};

use bend_domain as domain;
use serde_json::json;

pub static NECK_TILT_JSON: LazyLock<serde_json::Value> = LazyLock::new(|| {
    json!({
        "id": "neck-tilt",
        "name": "neck tilt",
        "category": "neck",
        "difficulty": "beginner",
        "position": "sitting",
        "equipment": "none",
        "muscleGroups": ["neck", "traps"],
        "tags": ["desk", "office"],
        "defaultDuration": 30,
        "needsSideSwitch": true,
        "translations": {
            "en": {
                "name": "Neck Tilt",
                "description": "Tilt your head towards your shoulder.",
                "instructions": ["Sit upright.", "Tilt slowly."]
            },
            "de": {
                "name": "Nackenneigung",
                "instructions": "Aufrecht sitzen."
            }
        }
    })
});

pub static NECK_TILT: LazyLock<domain::Exercise> = LazyLock::new(|| domain::Exercise {
    id: "neck-tilt".into(),
    name: "neck tilt".to_string(),
    description: String::new(),
    instructions: vec![],
    category: "neck".to_string(),
    difficulty: "beginner".to_string(),
    position: "sitting".to_string(),
    equipment: "none".to_string(),
    muscle_groups: ["neck".to_string(), "traps".to_string()].into(),
    tags: ["desk".to_string(), "office".to_string()].into(),
    default_duration: 30,
    needs_side_switch: true,
    translations: BTreeMap::from([
        (
            domain::Language::En,
            domain::ExerciseText {
                name: "Neck Tilt".to_string(),
                description: "Tilt your head towards your shoulder.".to_string(),
                instructions: vec!["Sit upright.".to_string(), "Tilt slowly.".to_string()],
            },
        ),
        (
            domain::Language::De,
            domain::ExerciseText {
                name: "Nackenneigung".to_string(),
                description: String::new(),
                instructions: vec!["Aufrecht sitzen.".to_string()],
            },
        ),
    ]),
});

pub static DAILY_JSON: LazyLock<serde_json::Value> = LazyLock::new(|| {
    json!({
        "id": "daily",
        "routines": ["morning-flow", "desk-break"],
        "translations": {
            "en": { "name": "Daily", "description": "Short daily routines" },
            "es": { "name": "Diario" }
        }
    })
});

pub static CUSTOM_ROUTINE: LazyLock<domain::Routine> = LazyLock::new(|| domain::Routine {
    id: "custom-1".into(),
    name: "Lunch Break".to_string(),
    description: String::new(),
    target_duration: 50,
    exercises: vec![
        domain::RoutineEntry {
            exercise_id: "neck-tilt".into(),
            duration: Some(20),
            order: 1,
            needs_side_switch: None,
        },
        domain::RoutineEntry {
            exercise_id: "cat-cow".into(),
            duration: Some(30),
            order: 2,
            needs_side_switch: None,
        },
    ],
    translations: BTreeMap::new(),
    custom: true,
});
