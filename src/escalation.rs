//! Report intake and auto-escalation
//!
//! Users can report live reviews. Once the report count for a review crosses
//! the escalation threshold it is pulled back to flagged for human review.
//! The flag transition is conditional on the review still being live, so
//! concurrent reports and moderator actions cannot fight over the status.

use crate::app_config;
use crate::constants::MAX_REPORT_DETAIL_LENGTH;
use crate::error::CoreError;
use crate::status::{ReportReason, ReviewStatus};
use crate::store::ModerationStore;

/// Result of filing one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub review_id: i32,
    /// Total reports now on record for this review.
    pub report_count: u64,
    /// Whether this report tripped the auto-flag.
    pub escalated: bool,
}

/// File a report against a review.
///
/// Only live reviews are reportable; anything else reads as not found, the
/// same as a nonexistent id, so reporters cannot probe moderation state.
pub async fn submit_report(
    store: &dyn ModerationStore,
    review_id: i32,
    reason: ReportReason,
    detail: Option<&str>,
) -> Result<ReportOutcome, CoreError> {
    let review = store
        .find_review(review_id)
        .await?
        .filter(|r| r.status == ReviewStatus::Live)
        .ok_or(CoreError::NotFound("Review"))?;

    let detail = detail
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| d.chars().take(MAX_REPORT_DETAIL_LENGTH).collect::<String>());

    store.insert_report(review.id, reason, detail).await?;

    let report_count = store.count_reports(review.id).await?;
    let threshold = app_config::get().moderation.report_escalation_threshold;

    let mut escalated = false;
    if report_count >= threshold {
        // No-op if a moderator already acted or an earlier report won.
        escalated = store
            .set_review_status_if(review.id, ReviewStatus::Live, ReviewStatus::Flagged)
            .await?;
        if escalated {
            log::info!(
                "Review {} auto-flagged after {} reports",
                review.id,
                report_count
            );
            store
                .refresh_professor_aggregates(review.professor_id)
                .await?;
        }
    }

    Ok(ReportOutcome {
        review_id: review.id,
        report_count,
        escalated,
    })
}
