//src/calculations.rs
//! Pure calculation helpers shared by the session manager and analytics.

use crate::config::Units;
use chrono::Utc;
use uuid::Uuid;

/// Estimated one-rep max (Epley), rounded to the nearest whole unit.
/// A single-rep set is already a max and is returned unchanged.
///
/// Precondition: `reps >= 1`.
#[must_use]
pub fn one_rep_max(weight: f64, reps: u32) -> f64 {
    if reps == 1 {
        return weight;
    }
    (weight * (1.0 + f64::from(reps) / 30.0)).round()
}

/// Work performed in one set: `weight * reps`, no rounding.
#[must_use]
pub fn volume(weight: f64, reps: u32) -> f64 {
    weight * f64::from(reps)
}

/// Suggests the two descending dropset weights (~80% and ~60% of the
/// working weight), rounded to the nearest loadable increment: 2.5 for
/// metric plates, 5 for imperial.
#[must_use]
pub fn suggest_dropset_weights(current_weight: f64, units: Units) -> [f64; 2] {
    let first_drop = (current_weight * 0.8).round();
    let second_drop = (current_weight * 0.6).round();

    let increment = match units {
        Units::Metric => 2.5,
        Units::Imperial => 5.0,
    };

    [
        (first_drop / increment).round() * increment,
        (second_drop / increment).round() * increment,
    ]
}

/// Renders a duration as `"1h 2m"`, `"2m 5s"`, or `"45s"`, whichever fits.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Generates a locally unique id: epoch millis plus a random suffix.
/// Ids are only ever compared within one device's store, so this does not
/// need to be cryptographic or globally unique.
#[must_use]
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("{millis}-{}", &random[..9])
}
