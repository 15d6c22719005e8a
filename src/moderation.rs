//! Moderation state machine
//!
//! Applies moderator decisions to reviews, single or in bulk, and keeps the
//! professor aggregate projections in step with visibility changes.

use std::collections::BTreeSet;

use crate::app_config;
use crate::constants::TRENDING_REFRESH_BATCH_SIZE;
use crate::error::CoreError;
use crate::status::{ActorRole, ModerationAction, ReviewStatus};
use crate::store::ModerationStore;

/// Result of a single moderation action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub review_id: i32,
    pub old_status: ReviewStatus,
    pub new_status: ReviewStatus,
}

/// Result of a bulk moderation action.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome {
    /// Rows actually updated. Ids with no matching review are skipped, so
    /// this can be lower than the requested id count.
    pub updated_count: u64,
    pub affected_professor_count: usize,
}

/// Apply one moderation action to one review.
///
/// Every action is total: any review in any status accepts any action. The
/// aggregate projection is recomputed only when the review crossed the
/// visibility boundary, in either direction.
pub async fn apply_action(
    store: &dyn ModerationStore,
    actor: ActorRole,
    review_id: i32,
    action: ModerationAction,
) -> Result<ActionOutcome, CoreError> {
    if !actor.can_moderate() {
        return Err(CoreError::Forbidden);
    }

    let review = store
        .find_review(review_id)
        .await?
        .ok_or(CoreError::NotFound("Review"))?;

    let new_status = action.target_status();
    store.set_review_status(review_id, new_status).await?;

    if review.status == ReviewStatus::Live || new_status == ReviewStatus::Live {
        store
            .refresh_professor_aggregates(review.professor_id)
            .await?;
    }

    log::info!(
        "Moderation: review {} {} -> {} ({:?} by {:?})",
        review_id,
        review.status,
        new_status,
        action,
        actor
    );

    Ok(ActionOutcome {
        review_id,
        old_status: review.status,
        new_status,
    })
}

/// Apply one moderation action uniformly to a set of reviews.
///
/// Ids that match no review are silently excluded. Aggregates are recomputed
/// once per distinct affected professor; the trending projection is refreshed
/// best-effort when the batch is large enough to matter.
pub async fn apply_bulk_action(
    store: &dyn ModerationStore,
    actor: ActorRole,
    review_ids: &[i32],
    action: ModerationAction,
) -> Result<BulkOutcome, CoreError> {
    if !actor.can_bulk_moderate() {
        return Err(CoreError::Forbidden);
    }

    let max_ids = app_config::get().moderation.max_bulk_action_ids;
    if review_ids.is_empty() {
        return Err(CoreError::Validation(
            "Bulk action requires at least one review id".to_string(),
        ));
    }
    if review_ids.len() > max_ids {
        return Err(CoreError::Validation(format!(
            "Bulk action limited to {} reviews per request",
            max_ids
        )));
    }

    let existing = store.find_reviews(review_ids).await?;
    if existing.is_empty() {
        return Ok(BulkOutcome {
            updated_count: 0,
            affected_professor_count: 0,
        });
    }

    let existing_ids: Vec<i32> = existing.iter().map(|r| r.id).collect();
    let new_status = action.target_status();
    let updated_count = store
        .set_review_status_bulk(&existing_ids, new_status)
        .await?;

    let professors: BTreeSet<i32> = existing.iter().map(|r| r.professor_id).collect();
    let professor_ids: Vec<i32> = professors.iter().copied().collect();
    store
        .refresh_professor_aggregates_batch(&professor_ids)
        .await?;

    if updated_count >= TRENDING_REFRESH_BATCH_SIZE as u64 {
        if let Err(err) = store.refresh_trending().await {
            log::warn!("Trending refresh failed after bulk action: {}", err);
        }
    }

    log::info!(
        "Bulk moderation: {} reviews -> {} ({:?} by {:?}, {} professors)",
        updated_count,
        new_status,
        action,
        actor,
        professor_ids.len()
    );

    Ok(BulkOutcome {
        updated_count,
        affected_professor_count: professor_ids.len(),
    })
}
