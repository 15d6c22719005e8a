//! Integration tests for report intake and auto-escalation

mod common;

use common::fixtures::*;
use common::store::MemoryStore;

use taqyeem::error::CoreError;
use taqyeem::escalation;
use taqyeem::status::{ReportReason, ReviewStatus};

#[actix_rt::test]
async fn test_only_live_reviews_are_reportable() {
    let store = MemoryStore::new();
    let pending = store.seed_review(seeded_review("user-aaaa", PROFESSOR_ID, ReviewStatus::Pending));
    let removed = store.seed_review(seeded_review("user-bbbb", PROFESSOR_ID, ReviewStatus::Removed));

    for id in [pending, removed, 9999] {
        let err = escalation::submit_report(&store, id, ReportReason::Spam, None)
            .await
            .unwrap_err();
        // Non-live and nonexistent reviews are indistinguishable to reporters
        assert!(matches!(err, CoreError::NotFound("Review")));
    }
}

#[actix_rt::test]
async fn test_reports_below_threshold_leave_review_live() {
    let store = MemoryStore::new();
    let id = store.seed_review(seeded_review("user-aaaa", PROFESSOR_ID, ReviewStatus::Live));

    for _ in 0..2 {
        let outcome = escalation::submit_report(&store, id, ReportReason::Inaccurate, None)
            .await
            .unwrap();
        assert!(!outcome.escalated);
    }

    assert_eq!(store.review(id).unwrap().status, ReviewStatus::Live);
    assert!(store.aggregate_refreshes().is_empty());
}

#[actix_rt::test]
async fn test_third_report_auto_flags() {
    let store = MemoryStore::new();
    let id = store.seed_review(seeded_review("user-aaaa", PROFESSOR_ID, ReviewStatus::Live));

    escalation::submit_report(&store, id, ReportReason::Spam, None)
        .await
        .unwrap();
    escalation::submit_report(&store, id, ReportReason::Offensive, Some("rude wording"))
        .await
        .unwrap();
    let outcome = escalation::submit_report(&store, id, ReportReason::Inaccurate, None)
        .await
        .unwrap();

    assert!(outcome.escalated);
    assert_eq!(outcome.report_count, 3);
    assert_eq!(store.review(id).unwrap().status, ReviewStatus::Flagged);
    // Leaving visibility recomputes the professor's aggregates
    assert_eq!(store.aggregate_refreshes(), vec![PROFESSOR_ID]);
}

#[actix_rt::test]
async fn test_flagged_review_no_longer_accepts_reports() {
    let store = MemoryStore::new();
    let id = store.seed_review(seeded_review("user-aaaa", PROFESSOR_ID, ReviewStatus::Live));

    for _ in 0..3 {
        escalation::submit_report(&store, id, ReportReason::Spam, None)
            .await
            .unwrap();
    }
    assert_eq!(store.review(id).unwrap().status, ReviewStatus::Flagged);

    let err = escalation::submit_report(&store, id, ReportReason::Spam, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound("Review")));
    assert_eq!(store.reports_for(id).len(), 3);
}

#[actix_rt::test]
async fn test_report_detail_trimmed_and_capped() {
    let store = MemoryStore::new();
    let id = store.seed_review(seeded_review("user-aaaa", PROFESSOR_ID, ReviewStatus::Live));

    let long_detail = "x".repeat(600);
    escalation::submit_report(&store, id, ReportReason::Other, Some(&long_detail))
        .await
        .unwrap();
    escalation::submit_report(&store, id, ReportReason::Other, Some("   "))
        .await
        .unwrap();

    let reports = store.reports_for(id);
    assert_eq!(reports[0].detail.as_ref().unwrap().chars().count(), 500);
    // Whitespace-only detail is stored as no detail
    assert!(reports[1].detail.is_none());
}
