//src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Unknown muscle group: {0}")]
pub struct UnknownMuscleGroup(pub String);

/// Fixed muscle-group catalog. Stored lowercase in JSON.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Quadriceps,
    Hamstrings,
    Glutes,
    Calves,
    Abs,
    Arms,
    Legs,
    Core,
    Cardio,
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

/// Parses a muscle-group name case-insensitively.
/// # Errors
/// Returns `UnknownMuscleGroup` if the name matches no variant.
pub fn parse_muscle_group(name: &str) -> Result<MuscleGroup, UnknownMuscleGroup> {
    for group in MuscleGroup::iter() {
        if format!("{group:?}").eq_ignore_ascii_case(name.trim()) {
            return Ok(group);
        }
    }
    Err(UnknownMuscleGroup(name.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Machine,
    Cable,
    Bodyweight,
    Band,
    Kettlebell,
    Bench,
    Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Catalog exercise. Immutable reference data as far as this crate is
/// concerned; workouts embed a snapshot of it (see [`WorkoutExercise`]) so
/// that later catalog edits never rewrite history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_muscles: Option<Vec<MuscleGroup>>,
    pub equipment: Equipment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// A single performed set. Warm-up sets are excluded from volume and
/// personal-record computations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: String,
    pub reps: u32,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
    #[serde(default)]
    pub is_dropset: bool,
    #[serde(default)]
    pub is_warmup: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Field-level patch applied by `update_set`. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct SetUpdate {
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub rpe: Option<Option<f64>>,
    pub rest_seconds: Option<Option<u32>>,
    pub is_dropset: Option<bool>,
    pub is_warmup: Option<bool>,
    pub notes: Option<Option<String>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SetUpdate {
    pub(crate) fn apply_to(&self, set: &mut WorkoutSet) {
        if let Some(reps) = self.reps {
            set.reps = reps;
        }
        if let Some(weight) = self.weight {
            set.weight = weight;
        }
        if let Some(rpe) = self.rpe {
            set.rpe = rpe;
        }
        if let Some(rest) = self.rest_seconds {
            set.rest_seconds = rest;
        }
        if let Some(dropset) = self.is_dropset {
            set.is_dropset = dropset;
        }
        if let Some(warmup) = self.is_warmup {
            set.is_warmup = warmup;
        }
        if let Some(ref notes) = self.notes {
            set.notes = notes.clone();
        }
        if let Some(completed_at) = self.completed_at {
            set.completed_at = completed_at;
        }
    }
}

/// An exercise as performed inside one workout: the catalog reference plus
/// a denormalized snapshot and the ordered sets (insertion order is the
/// performed order).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub id: String,
    pub exercise_id: String,
    pub exercise: Exercise,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_superset_with: Option<String>,
}

/// Aggregate root. A workout with no `completed_at` is the active one;
/// presence of `completed_at` is the sole state discriminator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall-clock seconds between start and completion. Set once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Computed once at completion and frozen thereafter.
    #[serde(default)]
    pub total_volume: f64,
}

impl Workout {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Best-known set for one exercise, by estimated one-rep max. Derived on
/// read from the historical list; never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub exercise_id: String,
    pub weight: f64,
    pub reps: u32,
    pub one_rep_max: f64,
    pub achieved_at: DateTime<Utc>,
}
