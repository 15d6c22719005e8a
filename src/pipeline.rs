//! Review admission pipeline
//!
//! Single entry point for accepting a review: validates the payload,
//! sanitizes it, runs the guard and the content scan, then persists the
//! review with its derived status. The only write that may fail without
//! failing the submission is the rate-limit bookkeeping event.

use chrono::Utc;

use crate::error::CoreError;
use crate::guard::{self, GuardInput, GuardPolicy};
use crate::orm::reviews::GradeReceived;
use crate::sanitize;
use crate::scanner::{self, FLAG_BRIGADING};
use crate::semester;
use crate::status::ReviewStatus;
use crate::store::{ModerationStore, NewReview};

/// Comment length at which a submission earns the higher point award.
const SUBSTANTIVE_COMMENT_CHARS: usize = 30;
const POINTS_SUBSTANTIVE: u32 = 50;
const POINTS_BASE: u32 = 30;

/// Raw submission payload after transport decoding, before any validation.
#[derive(Debug, Clone)]
pub struct ReviewCandidate {
    pub professor_id: i32,
    pub course_id: i32,
    pub anon_user_hash: String,
    pub ip_hash: String,
    pub user_agent_hash: String,
    pub rating_quality: f32,
    pub rating_difficulty: f32,
    pub would_take_again: Option<bool>,
    pub attendance_mandatory: Option<bool>,
    pub uses_textbook: Option<bool>,
    pub grade_received: Option<GradeReceived>,
    pub tags: Vec<String>,
    pub comment: String,
}

/// What an accepted submission reports back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub review_id: i32,
    pub status: ReviewStatus,
    pub points_earned: u32,
}

/// Ratings run a half-point scale from 0.5 to 5.0.
fn valid_rating(value: f32) -> bool {
    if !(0.5..=5.0).contains(&value) {
        return false;
    }
    let doubled = value * 2.0;
    (doubled - doubled.round()).abs() < f32::EPSILON
}

/// Admit one review submission end to end.
pub async fn submit(
    store: &dyn ModerationStore,
    policy: &GuardPolicy,
    candidate: ReviewCandidate,
) -> Result<SubmissionOutcome, CoreError> {
    // Payload validation costs nothing; it runs before any store access.
    if !valid_rating(candidate.rating_quality) {
        return Err(CoreError::Validation(
            "Quality rating must be between 0.5 and 5.0 in half-point steps".to_string(),
        ));
    }
    if !valid_rating(candidate.rating_difficulty) {
        return Err(CoreError::Validation(
            "Difficulty rating must be between 0.5 and 5.0 in half-point steps".to_string(),
        ));
    }

    let comment = sanitize::sanitize_comment(&candidate.comment);
    let tags = sanitize::sanitize_tags(&candidate.tags);

    let now = Utc::now();
    let semester_window = semester::semester_window(now);

    let verdict = guard::check_submission(
        store,
        policy,
        &GuardInput {
            anon_user_hash: &candidate.anon_user_hash,
            ip_hash: &candidate.ip_hash,
            professor_id: candidate.professor_id,
            course_id: candidate.course_id,
            semester_window: &semester_window,
        },
    )
    .await?;

    // Scan the raw text: redaction strips exactly the contact patterns the
    // doxxing detector needs to see. Only the sanitized form is stored.
    let scan = scanner::scan(&candidate.comment);
    let mut status = scan.suggested_status;
    let mut risk_flags = scan.risk_flags;

    // A brigade wave never downgrades a scanner verdict, only raises it.
    if verdict.brigading {
        risk_flags.insert(FLAG_BRIGADING.to_string());
        status = ReviewStatus::max_severity(status, ReviewStatus::Flagged);
    }

    let points_earned = if comment.chars().count() >= SUBSTANTIVE_COMMENT_CHARS {
        POINTS_SUBSTANTIVE
    } else {
        POINTS_BASE
    };

    let review_id = store
        .insert_review(NewReview {
            professor_id: candidate.professor_id,
            course_id: candidate.course_id,
            university_id: verdict.university_id,
            anon_user_hash: candidate.anon_user_hash.clone(),
            ip_hash: candidate.ip_hash.clone(),
            user_agent_hash: candidate.user_agent_hash,
            rating_quality: candidate.rating_quality,
            rating_difficulty: candidate.rating_difficulty,
            would_take_again: candidate.would_take_again,
            attendance_mandatory: candidate.attendance_mandatory,
            uses_textbook: candidate.uses_textbook,
            grade_received: candidate.grade_received,
            tags,
            comment,
            status,
            toxicity_score: scan.toxicity_score,
            risk_flags,
            semester_window,
            created_at: now.naive_utc(),
        })
        .await?;

    // Bookkeeping only; the review is already accepted.
    if let Err(err) = store
        .record_rate_event(&candidate.anon_user_hash, &candidate.ip_hash)
        .await
    {
        log::warn!(
            "Rate-limit bookkeeping failed for review {}: {}",
            review_id,
            err
        );
    }

    Ok(SubmissionOutcome {
        review_id,
        status,
        points_earned,
    })
}
