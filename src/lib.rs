// src/lib.rs
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

// --- Declare modules ---
pub mod analytics;
pub mod calculations;
mod config;
pub mod models;
pub mod storage;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util,
    load as load_config_util,
    save as save_config_util,
    Config,
    Error as ConfigError,
    Units,
};
pub use analytics::{DayVolume, Intensity, Streaks, WeeklyVolume};
pub use models::{
    parse_muscle_group, Difficulty, Equipment, Exercise, MuscleGroup, PersonalRecord, SetUpdate,
    Workout, WorkoutExercise, WorkoutSet,
};
pub use storage::{
    FileStore, MemoryStore, StorageBackend, StorageError, ACTIVE_WORKOUT_KEY, WORKOUTS_KEY,
};

#[derive(Error, Debug)]
pub enum WorkoutError {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),
    #[error("No workout is currently active.")]
    NoActiveWorkout,
    #[error("A workout is already active; complete or cancel it first.")]
    WorkoutAlreadyActive,
    #[error("User id cannot be empty.")]
    EmptyUserId,
    #[error("Exercise '{0}' is not part of the active workout.")]
    ExerciseNotFound(String),
    #[error("Set '{set_id}' not found in exercise '{exercise_id}'.")]
    SetNotFound {
        exercise_id: String,
        set_id: String,
    },
}

/// Session manager: owns the single active-workout slot and the historical
/// workout list, and persists both through a [`StorageBackend`].
///
/// Every mutation is two-phase: the next state is computed, durably
/// persisted, and only then published in memory. A failed write therefore
/// leaves the previously observable state intact. Operations are expected
/// to be issued serially by one caller; the service holds no lock.
pub struct WorkoutService<S: StorageBackend> {
    pub config: Config,
    store: S,
    active: Option<Workout>,
    workouts: Vec<Workout>,
}

impl WorkoutService<FileStore> {
    /// Initializes the service with on-device config and file storage.
    /// # Errors
    /// Returns `anyhow::Error` if config/data path determination, loading,
    /// or stored-state deserialization fails.
    pub async fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .context(format!("Failed to load config from {config_path:?}"))?;

        let store = FileStore::open_default().context("Failed to open workout data store")?;

        Self::with_store(store, config)
            .await
            .context("Failed to load persisted workout state")
            .map_err(Into::into)
    }
}

impl<S: StorageBackend> WorkoutService<S> {
    /// Creates a service over an arbitrary storage backend, loading any
    /// persisted history and active workout from it.
    /// # Errors
    /// Returns `WorkoutError::Storage` if reading or decoding stored
    /// documents fails.
    pub async fn with_store(store: S, config: Config) -> Result<Self, WorkoutError> {
        let workouts = match store.get(WORKOUTS_KEY).await? {
            Some(value) => serde_json::from_value(value).map_err(StorageError::from)?,
            None => Vec::new(),
        };
        let active = match store.get(ACTIVE_WORKOUT_KEY).await? {
            Some(value) => Some(serde_json::from_value(value).map_err(StorageError::from)?),
            None => None,
        };
        Ok(Self {
            config,
            store,
            active,
            workouts,
        })
    }

    // --- Command surface ---

    /// Starts a new workout for `user_id` and persists it as the active one.
    /// # Errors
    /// - `WorkoutError::WorkoutAlreadyActive` if a workout is in progress.
    /// - `WorkoutError::EmptyUserId` for a blank user id.
    /// - `WorkoutError::Storage` if persisting fails (no state change).
    pub async fn start_workout(&mut self, user_id: &str) -> Result<&Workout, WorkoutError> {
        if self.active.is_some() {
            return Err(WorkoutError::WorkoutAlreadyActive);
        }
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(WorkoutError::EmptyUserId);
        }

        let now = Utc::now();
        let workout = Workout {
            id: calculations::generate_id(),
            user_id: user_id.to_string(),
            date: now,
            started_at: now,
            completed_at: None,
            duration: None,
            exercises: Vec::new(),
            notes: None,
            total_volume: 0.0,
        };

        self.persist_active(&workout).await?;
        info!(workout_id = %workout.id, "started workout");
        Ok(self.active.insert(workout))
    }

    /// Appends an exercise to the active workout, keeping the caller's
    /// `order` for display sequencing.
    /// # Errors
    /// - `WorkoutError::NoActiveWorkout` if the slot is empty.
    /// - `WorkoutError::Storage` if persisting fails (no state change).
    pub async fn add_exercise(&mut self, exercise: WorkoutExercise) -> Result<(), WorkoutError> {
        let mut next = self.active_clone()?;
        debug!(workout_id = %next.id, exercise_id = %exercise.exercise_id, "adding exercise");
        next.exercises.push(exercise);
        self.persist_and_publish(next).await
    }

    /// Appends a set to the identified exercise, in performed order.
    /// # Errors
    /// - `WorkoutError::NoActiveWorkout` / `WorkoutError::ExerciseNotFound`;
    ///   state is untouched in both cases.
    /// - `WorkoutError::Storage` if persisting fails (no state change).
    pub async fn add_set(
        &mut self,
        exercise_id: &str,
        set: WorkoutSet,
    ) -> Result<(), WorkoutError> {
        let mut next = self.active_clone()?;
        let exercise = find_exercise(&mut next, exercise_id)?;
        exercise.sets.push(set);
        self.persist_and_publish(next).await
    }

    /// Merges `updates` into the matching set; fields left `None` in the
    /// patch keep their current value.
    /// # Errors
    /// - `WorkoutError::NoActiveWorkout` / `ExerciseNotFound` / `SetNotFound`.
    /// - `WorkoutError::Storage` if persisting fails (no state change).
    pub async fn update_set(
        &mut self,
        exercise_id: &str,
        set_id: &str,
        updates: &SetUpdate,
    ) -> Result<(), WorkoutError> {
        let mut next = self.active_clone()?;
        let exercise = find_exercise(&mut next, exercise_id)?;
        let set = exercise
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
            .ok_or_else(|| WorkoutError::SetNotFound {
                exercise_id: exercise_id.to_string(),
                set_id: set_id.to_string(),
            })?;
        updates.apply_to(set);
        self.persist_and_publish(next).await
    }

    /// Removes the matching set from the identified exercise.
    /// # Errors
    /// - `WorkoutError::NoActiveWorkout` / `ExerciseNotFound` / `SetNotFound`.
    /// - `WorkoutError::Storage` if persisting fails (no state change).
    pub async fn remove_set(
        &mut self,
        exercise_id: &str,
        set_id: &str,
    ) -> Result<(), WorkoutError> {
        let mut next = self.active_clone()?;
        let exercise = find_exercise(&mut next, exercise_id)?;
        let before = exercise.sets.len();
        exercise.sets.retain(|s| s.id != set_id);
        if exercise.sets.len() == before {
            return Err(WorkoutError::SetNotFound {
                exercise_id: exercise_id.to_string(),
                set_id: set_id.to_string(),
            });
        }
        self.persist_and_publish(next).await
    }

    /// Finalizes the active workout: freezes its total volume (warm-up sets
    /// excluded), stamps completion time and duration, appends it to the
    /// historical list, and clears the active slot.
    /// # Errors
    /// - `WorkoutError::NoActiveWorkout` if the slot is already empty.
    /// - `WorkoutError::Storage` if persisting fails.
    pub async fn complete_workout(&mut self) -> Result<Workout, WorkoutError> {
        let mut finished = self.active_clone()?;

        let total_volume: f64 = finished
            .exercises
            .iter()
            .flat_map(|ex| ex.sets.iter())
            .filter(|set| !set.is_warmup)
            .map(|set| calculations::volume(set.weight, set.reps))
            .sum();

        let now = Utc::now();
        finished.completed_at = Some(now);
        finished.duration = Some((now - finished.started_at).num_seconds().max(0));
        finished.total_volume = total_volume;

        let mut next_history = self.workouts.clone();
        next_history.push(finished.clone());

        // History is persisted before the slot is cleared so a failure
        // between the two writes can never lose a finished workout.
        self.persist_workouts(&next_history).await?;
        self.workouts = next_history;
        self.store.remove(ACTIVE_WORKOUT_KEY).await?;
        self.active = None;

        info!(workout_id = %finished.id, total_volume, "completed workout");
        Ok(finished)
    }

    /// Discards the active workout without recording it. Calling this with
    /// no active workout is a harmless no-op.
    /// # Errors
    /// Returns `WorkoutError::Storage` if clearing the slot fails.
    pub async fn cancel_workout(&mut self) -> Result<(), WorkoutError> {
        if self.active.is_none() {
            return Ok(());
        }
        self.store.remove(ACTIVE_WORKOUT_KEY).await?;
        if let Some(discarded) = self.active.take() {
            info!(workout_id = %discarded.id, "cancelled workout");
        }
        Ok(())
    }

    // --- Query surface ---

    pub fn active_workout(&self) -> Option<&Workout> {
        self.active.as_ref()
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// Completed workouts, newest first, optionally limited.
    #[must_use]
    pub fn history(&self, limit: Option<usize>) -> Vec<Workout> {
        let mut sorted = self.workouts.clone();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = limit {
            sorted.truncate(limit);
        }
        sorted
    }

    /// Derived personal-records map keyed by exercise id.
    #[must_use]
    pub fn personal_records(&self) -> HashMap<String, PersonalRecord> {
        analytics::personal_records(&self.workouts)
    }

    /// All-time completed volume.
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        analytics::total_volume(&self.workouts)
    }

    /// Completed volume in the trailing `window_days` days.
    #[must_use]
    pub fn volume_in_window(&self, window_days: u32) -> f64 {
        analytics::volume_in_window(&self.workouts, window_days, today())
    }

    /// Number of workouts completed in the trailing `window_days` days.
    #[must_use]
    pub fn workout_count_in_window(&self, window_days: u32) -> usize {
        analytics::workout_count_in_window(&self.workouts, window_days, today())
    }

    /// Current and longest streaks inside the configured look-back window.
    #[must_use]
    pub fn streaks(&self) -> Streaks {
        analytics::streaks(&self.workouts, self.config.streak_window_days, today())
    }

    /// Per-day intensity tiers over the configured consistency window.
    #[must_use]
    pub fn consistency_grid(&self) -> Vec<DayVolume> {
        analytics::consistency_grid(
            &self.workouts,
            self.config.consistency_window_days,
            self.config.low_volume_threshold,
            self.config.high_volume_threshold,
            today(),
        )
    }

    /// Completed volume bucketed by calendar week.
    #[must_use]
    pub fn weekly_volume(&self) -> Vec<WeeklyVolume> {
        analytics::weekly_volume(&self.workouts)
    }

    /// Dropset weight suggestions for the configured units.
    #[must_use]
    pub fn suggest_dropset_weights(&self, current_weight: f64) -> [f64; 2] {
        calculations::suggest_dropset_weights(current_weight, self.config.units)
    }

    // --- Config helpers ---

    /// Sets the measurement units in memory; callers persist via
    /// [`save_config_util`] with the path they loaded from.
    pub fn set_units(&mut self, units: Units) {
        self.config.units = units;
    }

    // --- Persistence helpers ---

    fn active_clone(&self) -> Result<Workout, WorkoutError> {
        self.active.clone().ok_or(WorkoutError::NoActiveWorkout)
    }

    async fn persist_and_publish(&mut self, next: Workout) -> Result<(), WorkoutError> {
        self.persist_active(&next).await?;
        self.active = Some(next);
        Ok(())
    }

    async fn persist_active(&self, workout: &Workout) -> Result<(), StorageError> {
        let value = serde_json::to_value(workout)?;
        self.store.set(ACTIVE_WORKOUT_KEY, value).await
    }

    async fn persist_workouts(&self, workouts: &[Workout]) -> Result<(), StorageError> {
        let value = serde_json::to_value(workouts)?;
        self.store.set(WORKOUTS_KEY, value).await
    }
}

// --- Helper Functions ---

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn find_exercise<'a>(
    workout: &'a mut Workout,
    exercise_id: &str,
) -> Result<&'a mut WorkoutExercise, WorkoutError> {
    workout
        .exercises
        .iter_mut()
        .find(|ex| ex.id == exercise_id || ex.exercise_id == exercise_id)
        .ok_or_else(|| WorkoutError::ExerciseNotFound(exercise_id.to_string()))
}
