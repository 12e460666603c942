//src/analytics.rs
//! Read-side analytics over the historical workout list.
//!
//! Everything here is a pure function of the persisted history, recomputed
//! on each call. There is no cache to invalidate and nothing is persisted;
//! the session manager owns the data, this module only reads it.

use crate::calculations;
use crate::models::{PersonalRecord, Workout};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Intensity tier of one calendar day in the consistency grid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
}

/// One cell of the consistency grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DayVolume {
    pub date: NaiveDate,
    pub volume: f64,
    pub intensity: Intensity,
}

/// Aggregated volume for one calendar week (starting Monday).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyVolume {
    pub week_start: NaiveDate,
    pub total_volume: f64,
    pub workout_count: usize,
}

/// Both streak notions; `current` is zero unless the run reaches today or
/// yesterday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Best set per exercise id across all completed history, ranked by
/// estimated one-rep max. Warm-up sets never count. The comparison is
/// strictly greater, so on a tie the earliest-scanned set keeps the record.
#[must_use]
pub fn personal_records(workouts: &[Workout]) -> HashMap<String, PersonalRecord> {
    let mut records: HashMap<String, PersonalRecord> = HashMap::new();

    for workout in workouts.iter().filter(|w| w.is_completed()) {
        for exercise in &workout.exercises {
            for set in &exercise.sets {
                if set.is_warmup {
                    continue;
                }
                let one_rep_max = calculations::one_rep_max(set.weight, set.reps.max(1));
                let beats_existing = records
                    .get(&exercise.exercise_id)
                    .map_or(true, |existing| one_rep_max > existing.one_rep_max);
                if beats_existing {
                    records.insert(
                        exercise.exercise_id.clone(),
                        PersonalRecord {
                            exercise_id: exercise.exercise_id.clone(),
                            weight: set.weight,
                            reps: set.reps,
                            one_rep_max,
                            achieved_at: set.completed_at,
                        },
                    );
                }
            }
        }
    }

    records
}

/// Sum of the frozen per-workout volumes across all completed history.
#[must_use]
pub fn total_volume(workouts: &[Workout]) -> f64 {
    workouts
        .iter()
        .filter(|w| w.is_completed())
        .map(|w| w.total_volume)
        .sum()
}

/// Sum of frozen volumes for workouts completed in the trailing window of
/// `window_days` days ending at `today` (inclusive).
#[must_use]
pub fn volume_in_window(workouts: &[Workout], window_days: u32, today: NaiveDate) -> f64 {
    let start = window_start(window_days, today);
    workouts
        .iter()
        .filter_map(|w| w.completed_at.map(|done| (w, done.date_naive())))
        .filter(|(_, date)| *date >= start && *date <= today)
        .map(|(w, _)| w.total_volume)
        .sum()
}

/// Number of workouts completed in the trailing window.
#[must_use]
pub fn workout_count_in_window(workouts: &[Workout], window_days: u32, today: NaiveDate) -> usize {
    let start = window_start(window_days, today);
    workouts
        .iter()
        .filter_map(|w| w.completed_at.map(|done| done.date_naive()))
        .filter(|date| *date >= start && *date <= today)
        .count()
}

/// Longest run of consecutive calendar days with at least one completed
/// workout inside the look-back window.
#[must_use]
pub fn longest_streak(workouts: &[Workout], window_days: u32, today: NaiveDate) -> u32 {
    let dates = completed_dates(workouts, window_days, today);

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for date in dates {
        run = match previous {
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }
    longest
}

/// Run of consecutive workout days ending today or yesterday; zero once a
/// full calendar day has passed without a completion.
#[must_use]
pub fn current_streak(workouts: &[Workout], window_days: u32, today: NaiveDate) -> u32 {
    let dates = completed_dates(workouts, window_days, today);
    let Some(&last) = dates.iter().next_back() else {
        return 0;
    };
    if today - last > Duration::days(1) {
        return 0;
    }

    let mut streak = 1u32;
    let mut cursor = last;
    for &date in dates.iter().rev().skip(1) {
        if cursor - date == Duration::days(1) {
            streak += 1;
            cursor = date;
        } else {
            break;
        }
    }
    streak
}

/// Both streak notions in one pass over the history.
#[must_use]
pub fn streaks(workouts: &[Workout], window_days: u32, today: NaiveDate) -> Streaks {
    Streaks {
        current: current_streak(workouts, window_days, today),
        longest: longest_streak(workouts, window_days, today),
    }
}

/// Per-day volume over the trailing window, bucketed into intensity tiers.
/// Returns one cell per day, ascending, ending at `today`. Display-only;
/// the tiers carry no further invariant.
#[must_use]
pub fn consistency_grid(
    workouts: &[Workout],
    window_days: u32,
    low_threshold: f64,
    high_threshold: f64,
    today: NaiveDate,
) -> Vec<DayVolume> {
    let start = window_start(window_days, today);

    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for workout in workouts {
        if let Some(done) = workout.completed_at {
            let date = done.date_naive();
            if date >= start && date <= today {
                *daily.entry(date).or_insert(0.0) += workout.total_volume;
            }
        }
    }

    start
        .iter_days()
        .take(window_days as usize)
        .map(|date| {
            let volume = daily.get(&date).copied().unwrap_or(0.0);
            let intensity = if volume <= 0.0 {
                Intensity::None
            } else if volume < low_threshold {
                Intensity::Low
            } else if volume < high_threshold {
                Intensity::Medium
            } else {
                Intensity::High
            };
            DayVolume {
                date,
                volume,
                intensity,
            }
        })
        .collect()
}

/// Completed volume bucketed by calendar week (weeks start Monday),
/// ascending.
#[must_use]
pub fn weekly_volume(workouts: &[Workout]) -> Vec<WeeklyVolume> {
    let mut weeks: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for workout in workouts {
        if let Some(done) = workout.completed_at {
            let date = done.date_naive();
            let week_start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            let entry = weeks.entry(week_start).or_insert((0.0, 0));
            entry.0 += workout.total_volume;
            entry.1 += 1;
        }
    }

    weeks
        .into_iter()
        .map(|(week_start, (total_volume, workout_count))| WeeklyVolume {
            week_start,
            total_volume,
            workout_count,
        })
        .collect()
}

fn window_start(window_days: u32, today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(window_days.saturating_sub(1)))
}

fn completed_dates(workouts: &[Workout], window_days: u32, today: NaiveDate) -> BTreeSet<NaiveDate> {
    let start = window_start(window_days, today);
    workouts
        .iter()
        .filter_map(|w| w.completed_at.map(|done| done.date_naive()))
        .filter(|date| *date >= start && *date <= today)
        .collect()
}
