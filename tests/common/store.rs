//! In-memory `ModerationStore` used by the integration tests.
//!
//! Mirrors the store contract closely enough to exercise the guard,
//! pipeline, state machine and escalation logic without a database. It also
//! records which projections were refreshed so tests can assert on the
//! recompute triggers.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Mutex;

use taqyeem::error::CoreError;
use taqyeem::status::{ReportReason, ReviewStatus};
use taqyeem::store::{ModerationStore, NewReview, ProfessorRef, ReviewRecord};

#[derive(Debug, Clone)]
pub struct StoredReview {
    pub id: i32,
    pub review: NewReview,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone)]
pub struct StoredReport {
    pub review_id: i32,
    pub reason: ReportReason,
    pub detail: Option<String>,
}

#[derive(Default)]
struct State {
    professors: Vec<ProfessorRef>,
    courses: Vec<i32>,
    reviews: Vec<StoredReview>,
    rate_events: Vec<(String, String, NaiveDateTime)>,
    reports: Vec<StoredReport>,
    aggregate_refreshes: Vec<i32>,
    trending_refreshes: usize,
    next_review_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_professor(self, id: i32, university_id: i32, is_active: bool) -> Self {
        self.state.lock().unwrap().professors.push(ProfessorRef {
            id,
            university_id,
            is_active,
        });
        self
    }

    pub fn with_course(self, id: i32) -> Self {
        self.state.lock().unwrap().courses.push(id);
        self
    }

    pub fn review(&self, review_id: i32) -> Option<StoredReview> {
        self.state
            .lock()
            .unwrap()
            .reviews
            .iter()
            .find(|r| r.id == review_id)
            .cloned()
    }

    pub fn review_count(&self) -> usize {
        self.state.lock().unwrap().reviews.len()
    }

    pub fn rate_event_count(&self) -> usize {
        self.state.lock().unwrap().rate_events.len()
    }

    pub fn reports_for(&self, review_id: i32) -> Vec<StoredReport> {
        self.state
            .lock()
            .unwrap()
            .reports
            .iter()
            .filter(|r| r.review_id == review_id)
            .cloned()
            .collect()
    }

    /// Professor ids whose aggregates were recomputed, in order.
    pub fn aggregate_refreshes(&self) -> Vec<i32> {
        self.state.lock().unwrap().aggregate_refreshes.clone()
    }

    pub fn trending_refreshes(&self) -> usize {
        self.state.lock().unwrap().trending_refreshes
    }

    /// Force a review into a status, bypassing the state machine.
    pub fn force_status(&self, review_id: i32, status: ReviewStatus) {
        let mut state = self.state.lock().unwrap();
        if let Some(review) = state.reviews.iter_mut().find(|r| r.id == review_id) {
            review.status = status;
        }
    }

    /// Seed a review row directly, as if admitted earlier.
    pub fn seed_review(&self, review: NewReview) -> i32 {
        let mut state = self.state.lock().unwrap();
        state.next_review_id += 1;
        let id = state.next_review_id;
        let status = review.status;
        state.reviews.push(StoredReview { id, review, status });
        id
    }
}

#[async_trait]
impl ModerationStore for MemoryStore {
    async fn find_professor(&self, professor_id: i32) -> Result<Option<ProfessorRef>, CoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .professors
            .iter()
            .find(|p| p.id == professor_id)
            .cloned())
    }

    async fn course_exists(&self, course_id: i32) -> Result<bool, CoreError> {
        Ok(self.state.lock().unwrap().courses.contains(&course_id))
    }

    async fn count_submissions_by_user(
        &self,
        anon_user_hash: &str,
        since: NaiveDateTime,
    ) -> Result<u64, CoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .rate_events
            .iter()
            .filter(|(user, _, at)| user == anon_user_hash && *at >= since)
            .count() as u64)
    }

    async fn count_submissions_by_ip(
        &self,
        ip_hash: &str,
        since: NaiveDateTime,
    ) -> Result<u64, CoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .rate_events
            .iter()
            .filter(|(_, ip, at)| ip == ip_hash && *at >= since)
            .count() as u64)
    }

    async fn has_active_review(
        &self,
        anon_user_hash: &str,
        professor_id: i32,
        course_id: i32,
        semester_window: &str,
    ) -> Result<bool, CoreError> {
        Ok(self.state.lock().unwrap().reviews.iter().any(|r| {
            r.review.anon_user_hash == anon_user_hash
                && r.review.professor_id == professor_id
                && r.review.course_id == course_id
                && r.review.semester_window == semester_window
                && r.status != ReviewStatus::Removed
        }))
    }

    async fn count_recent_professor_reviews(
        &self,
        professor_id: i32,
        since: NaiveDateTime,
    ) -> Result<u64, CoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .reviews
            .iter()
            .filter(|r| r.review.professor_id == professor_id && r.review.created_at >= since)
            .count() as u64)
    }

    async fn insert_review(&self, review: NewReview) -> Result<i32, CoreError> {
        Ok(self.seed_review(review))
    }

    async fn record_rate_event(
        &self,
        anon_user_hash: &str,
        ip_hash: &str,
    ) -> Result<(), CoreError> {
        self.state.lock().unwrap().rate_events.push((
            anon_user_hash.to_string(),
            ip_hash.to_string(),
            Utc::now().naive_utc(),
        ));
        Ok(())
    }

    async fn find_review(&self, review_id: i32) -> Result<Option<ReviewRecord>, CoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .reviews
            .iter()
            .find(|r| r.id == review_id)
            .map(|r| ReviewRecord {
                id: r.id,
                professor_id: r.review.professor_id,
                status: r.status,
            }))
    }

    async fn find_reviews(&self, review_ids: &[i32]) -> Result<Vec<ReviewRecord>, CoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .reviews
            .iter()
            .filter(|r| review_ids.contains(&r.id))
            .map(|r| ReviewRecord {
                id: r.id,
                professor_id: r.review.professor_id,
                status: r.status,
            })
            .collect())
    }

    async fn set_review_status(
        &self,
        review_id: i32,
        status: ReviewStatus,
    ) -> Result<(), CoreError> {
        self.force_status(review_id, status);
        Ok(())
    }

    async fn set_review_status_bulk(
        &self,
        review_ids: &[i32],
        status: ReviewStatus,
    ) -> Result<u64, CoreError> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for review in state.reviews.iter_mut() {
            if review_ids.contains(&review.id) {
                review.status = status;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn set_review_status_if(
        &self,
        review_id: i32,
        expected: ReviewStatus,
        status: ReviewStatus,
    ) -> Result<bool, CoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(review) = state
            .reviews
            .iter_mut()
            .find(|r| r.id == review_id && r.status == expected)
        {
            review.status = status;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn insert_report(
        &self,
        review_id: i32,
        reason: ReportReason,
        detail: Option<String>,
    ) -> Result<(), CoreError> {
        self.state.lock().unwrap().reports.push(StoredReport {
            review_id,
            reason,
            detail,
        });
        Ok(())
    }

    async fn count_reports(&self, review_id: i32) -> Result<u64, CoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .reports
            .iter()
            .filter(|r| r.review_id == review_id)
            .count() as u64)
    }

    async fn refresh_professor_aggregates(&self, professor_id: i32) -> Result<(), CoreError> {
        self.state
            .lock()
            .unwrap()
            .aggregate_refreshes
            .push(professor_id);
        Ok(())
    }

    async fn refresh_trending(&self) -> Result<(), CoreError> {
        self.state.lock().unwrap().trending_refreshes += 1;
        Ok(())
    }
}
