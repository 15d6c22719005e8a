//! Submission guard: identity, existence, rate-limit and duplicate checks
//!
//! Runs before any review row is written. All failures are rejections except
//! the brigade signal, which admits the submission but marks it for the
//! pipeline to downgrade.

use chrono::{Duration, Utc};
use futures::join;

use crate::app_config;
use crate::constants::MIN_ANON_HASH_LENGTH;
use crate::error::CoreError;
use crate::store::ModerationStore;

/// Tunable guard limits, snapshotted from configuration per submission.
#[derive(Debug, Clone)]
pub struct GuardPolicy {
    pub max_reviews_per_user_day: u64,
    pub max_reviews_per_ip_hour: u64,
    pub brigade_threshold: u64,
    pub brigade_window_secs: i64,
}

impl GuardPolicy {
    pub fn from_config() -> Self {
        let moderation = app_config::get().moderation;
        Self {
            max_reviews_per_user_day: moderation.max_reviews_per_user_day,
            max_reviews_per_ip_hour: moderation.max_reviews_per_ip_hour,
            brigade_threshold: moderation.brigade_threshold,
            brigade_window_secs: moderation.brigade_window_secs,
        }
    }
}

/// Outcome of a passed guard: what the pipeline needs downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardVerdict {
    /// University the professor belongs to, denormalized onto the review.
    pub university_id: i32,
    /// Unusual review velocity against this professor right now.
    pub brigading: bool,
}

/// Inputs the guard evaluates for one submission attempt.
#[derive(Debug, Clone)]
pub struct GuardInput<'a> {
    pub anon_user_hash: &'a str,
    pub ip_hash: &'a str,
    pub professor_id: i32,
    pub course_id: i32,
    pub semester_window: &'a str,
}

/// Evaluate every admission precondition for a submission.
///
/// Check order is deterministic: identity shape, then referenced entities,
/// then the caps and duplicate rule. The four store counts are independent
/// reads and run concurrently.
pub async fn check_submission(
    store: &dyn ModerationStore,
    policy: &GuardPolicy,
    input: &GuardInput<'_>,
) -> Result<GuardVerdict, CoreError> {
    if input.anon_user_hash.len() < MIN_ANON_HASH_LENGTH {
        return Err(CoreError::Validation("Invalid user identity".to_string()));
    }

    let professor = store
        .find_professor(input.professor_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or(CoreError::NotFound("Professor"))?;

    if !store.course_exists(input.course_id).await? {
        return Err(CoreError::NotFound("Course"));
    }

    let now = Utc::now();
    let day_ago = (now - Duration::hours(24)).naive_utc();
    let hour_ago = (now - Duration::hours(1)).naive_utc();
    let brigade_cutoff = (now - Duration::seconds(policy.brigade_window_secs)).naive_utc();

    let (user_count, ip_count, duplicate, professor_recent) = join!(
        store.count_submissions_by_user(input.anon_user_hash, day_ago),
        store.count_submissions_by_ip(input.ip_hash, hour_ago),
        store.has_active_review(
            input.anon_user_hash,
            input.professor_id,
            input.course_id,
            input.semester_window,
        ),
        store.count_recent_professor_reviews(input.professor_id, brigade_cutoff),
    );

    if user_count? >= policy.max_reviews_per_user_day {
        return Err(CoreError::RateLimited(
            "Daily review limit reached. Try again tomorrow.",
        ));
    }
    if ip_count? >= policy.max_reviews_per_ip_hour {
        return Err(CoreError::RateLimited(
            "Too many reviews from this network. Try again later.",
        ));
    }
    if duplicate? {
        return Err(CoreError::Duplicate);
    }

    Ok(GuardVerdict {
        university_id: professor.university_id,
        brigading: professor_recent? >= policy.brigade_threshold,
    })
}
