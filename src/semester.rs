//! Semester window labels
//!
//! The duplicate-submission rule is scoped to an academic period. Labels are
//! derived from wall-clock time as `{year}-{spring|summer|fall}`.

use chrono::{DateTime, Datelike, Utc};

/// Label for the semester containing `when`.
///
/// Months 1-5 are spring, 6-8 summer, 9-12 fall.
pub fn semester_window(when: DateTime<Utc>) -> String {
    let year = when.year();
    let term = match when.month() {
        1..=5 => "spring",
        6..=8 => "summer",
        _ => "fall",
    };
    format!("{}-{}", year, term)
}

/// Label for the current semester.
pub fn current_semester_window() -> String {
    semester_window(Utc::now())
}
