//! Persistent store seam for the moderation core
//!
//! The decision logic (guard, pipeline, state machine, escalation) depends
//! only on the `ModerationStore` trait, so it can be exercised against an
//! in-memory store in tests. `SeaOrmStore` is the production implementation
//! over the SeaORM pool.
//!
//! All checks issued through this trait are point-in-time reads, not
//! transactional locks. The duplicate check in particular is a documented
//! read-then-write race: two near-simultaneous submissions can both pass it.
//! Deployments wanting a hard guarantee should add a partial unique index
//! over (anon_user_hash, professor_id, course_id, semester_window) where
//! status != 'removed'; the application-level check stays as the fast path.

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{entity::*, query::*, sea_query::Expr, sea_query::OnConflict, ActiveValue::Set,
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::BTreeSet;

use crate::error::CoreError;
use crate::orm::reviews::GradeReceived;
use crate::orm::{professor_aggregates, professors, rate_limits, reports, reviews,
    trending_professors};
use crate::status::{ReportReason, ReviewStatus};

/// Days of history considered by the trending projection.
const TRENDING_WINDOW_DAYS: i64 = 30;

/// Professor row fields the guard cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfessorRef {
    pub id: i32,
    pub university_id: i32,
    pub is_active: bool,
}

/// Review row fields the state machine and escalation care about.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub id: i32,
    pub professor_id: i32,
    pub status: ReviewStatus,
}

/// A fully validated, scanned review ready to persist.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub professor_id: i32,
    pub course_id: i32,
    pub university_id: i32,
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
    pub status: ReviewStatus,
    pub toxicity_score: f32,
    pub risk_flags: BTreeSet<String>,
    pub semester_window: String,
    pub created_at: NaiveDateTime,
}

/// Store operations consumed by the moderation core.
#[async_trait]
pub trait ModerationStore: Send + Sync {
    async fn find_professor(&self, professor_id: i32) -> Result<Option<ProfessorRef>, CoreError>;

    async fn course_exists(&self, course_id: i32) -> Result<bool, CoreError>;

    /// Accepted submission events for this anonymous user since `since`.
    async fn count_submissions_by_user(
        &self,
        anon_user_hash: &str,
        since: NaiveDateTime,
    ) -> Result<u64, CoreError>;

    /// Accepted submission events from this IP fingerprint since `since`.
    async fn count_submissions_by_ip(
        &self,
        ip_hash: &str,
        since: NaiveDateTime,
    ) -> Result<u64, CoreError>;

    /// Whether a non-removed review exists for this submission tuple.
    async fn has_active_review(
        &self,
        anon_user_hash: &str,
        professor_id: i32,
        course_id: i32,
        semester_window: &str,
    ) -> Result<bool, CoreError>;

    /// Reviews by any author for this professor created since `since`.
    async fn count_recent_professor_reviews(
        &self,
        professor_id: i32,
        since: NaiveDateTime,
    ) -> Result<u64, CoreError>;

    async fn insert_review(&self, review: NewReview) -> Result<i32, CoreError>;

    /// Append one rate-limit bookkeeping event.
    async fn record_rate_event(
        &self,
        anon_user_hash: &str,
        ip_hash: &str,
    ) -> Result<(), CoreError>;

    async fn find_review(&self, review_id: i32) -> Result<Option<ReviewRecord>, CoreError>;

    /// Rows for the given ids; missing ids are simply absent from the result.
    async fn find_reviews(&self, review_ids: &[i32]) -> Result<Vec<ReviewRecord>, CoreError>;

    async fn set_review_status(
        &self,
        review_id: i32,
        status: ReviewStatus,
    ) -> Result<(), CoreError>;

    /// Uniform status update over an id set. Returns affected row count.
    async fn set_review_status_bulk(
        &self,
        review_ids: &[i32],
        status: ReviewStatus,
    ) -> Result<u64, CoreError>;

    /// Conditional status update: applies only while the row still holds
    /// `expected`. Returns whether a row was updated.
    async fn set_review_status_if(
        &self,
        review_id: i32,
        expected: ReviewStatus,
        status: ReviewStatus,
    ) -> Result<bool, CoreError>;

    async fn insert_report(
        &self,
        review_id: i32,
        reason: ReportReason,
        detail: Option<String>,
    ) -> Result<(), CoreError>;

    /// Total reports ever filed against this review.
    async fn count_reports(&self, review_id: i32) -> Result<u64, CoreError>;

    /// Rebuild the professor's aggregate row from currently-live reviews.
    /// Idempotent; safe to run concurrently for the same professor.
    async fn refresh_professor_aggregates(&self, professor_id: i32) -> Result<(), CoreError>;

    /// Rebuild aggregates for a set of professors. The default runs
    /// sequentially; stores with a batched path may override.
    async fn refresh_professor_aggregates_batch(
        &self,
        professor_ids: &[i32],
    ) -> Result<(), CoreError> {
        for professor_id in professor_ids {
            self.refresh_professor_aggregates(*professor_id).await?;
        }
        Ok(())
    }

    /// Rebuild the trending projection. Callers treat failure as
    /// best-effort.
    async fn refresh_trending(&self) -> Result<(), CoreError>;
}

/// Production store over a SeaORM connection.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ModerationStore for SeaOrmStore {
    async fn find_professor(&self, professor_id: i32) -> Result<Option<ProfessorRef>, CoreError> {
        let professor = professors::Entity::find_by_id(professor_id)
            .one(&self.db)
            .await?;
        Ok(professor.map(|p| ProfessorRef {
            id: p.id,
            university_id: p.university_id,
            is_active: p.is_active,
        }))
    }

    async fn course_exists(&self, course_id: i32) -> Result<bool, CoreError> {
        use crate::orm::courses;
        Ok(courses::Entity::find_by_id(course_id)
            .one(&self.db)
            .await?
            .is_some())
    }

    async fn count_submissions_by_user(
        &self,
        anon_user_hash: &str,
        since: NaiveDateTime,
    ) -> Result<u64, CoreError> {
        let count = rate_limits::Entity::find()
            .filter(rate_limits::Column::AnonUserHash.eq(anon_user_hash))
            .filter(rate_limits::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await?;
        Ok(count as u64)
    }

    async fn count_submissions_by_ip(
        &self,
        ip_hash: &str,
        since: NaiveDateTime,
    ) -> Result<u64, CoreError> {
        let count = rate_limits::Entity::find()
            .filter(rate_limits::Column::IpHash.eq(ip_hash))
            .filter(rate_limits::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await?;
        Ok(count as u64)
    }

    async fn has_active_review(
        &self,
        anon_user_hash: &str,
        professor_id: i32,
        course_id: i32,
        semester_window: &str,
    ) -> Result<bool, CoreError> {
        let existing = reviews::Entity::find()
            .filter(reviews::Column::AnonUserHash.eq(anon_user_hash))
            .filter(reviews::Column::ProfessorId.eq(professor_id))
            .filter(reviews::Column::CourseId.eq(course_id))
            .filter(reviews::Column::SemesterWindow.eq(semester_window))
            .filter(reviews::Column::Status.ne(ReviewStatus::Removed.as_str()))
            .one(&self.db)
            .await?;
        Ok(existing.is_some())
    }

    async fn count_recent_professor_reviews(
        &self,
        professor_id: i32,
        since: NaiveDateTime,
    ) -> Result<u64, CoreError> {
        let count = reviews::Entity::find()
            .filter(reviews::Column::ProfessorId.eq(professor_id))
            .filter(reviews::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await?;
        Ok(count as u64)
    }

    async fn insert_review(&self, review: NewReview) -> Result<i32, CoreError> {
        let risk_flags: serde_json::Map<String, serde_json::Value> = review
            .risk_flags
            .iter()
            .map(|flag| (flag.clone(), serde_json::Value::Bool(true)))
            .collect();

        let model = reviews::ActiveModel {
            professor_id: Set(review.professor_id),
            course_id: Set(review.course_id),
            university_id: Set(review.university_id),
            anon_user_hash: Set(review.anon_user_hash),
            rating_quality: Set(review.rating_quality),
            rating_difficulty: Set(review.rating_difficulty),
            would_take_again: Set(review.would_take_again),
            attendance_mandatory: Set(review.attendance_mandatory),
            uses_textbook: Set(review.uses_textbook),
            grade_received: Set(review.grade_received),
            tags: Set(serde_json::Value::from(review.tags)),
            comment: Set(review.comment),
            status: Set(review.status),
            toxicity_score: Set(review.toxicity_score),
            risk_flags: Set(serde_json::Value::Object(risk_flags)),
            ip_hash: Set(review.ip_hash),
            user_agent_hash: Set(review.user_agent_hash),
            semester_window: Set(review.semester_window),
            created_at: Set(review.created_at),
            updated_at: Set(review.created_at),
            ..Default::default()
        };

        let inserted = model.insert(&self.db).await?;
        Ok(inserted.id)
    }

    async fn record_rate_event(
        &self,
        anon_user_hash: &str,
        ip_hash: &str,
    ) -> Result<(), CoreError> {
        let event = rate_limits::ActiveModel {
            anon_user_hash: Set(anon_user_hash.to_string()),
            ip_hash: Set(ip_hash.to_string()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        event.insert(&self.db).await?;
        Ok(())
    }

    async fn find_review(&self, review_id: i32) -> Result<Option<ReviewRecord>, CoreError> {
        let review = reviews::Entity::find_by_id(review_id).one(&self.db).await?;
        Ok(review.map(|r| ReviewRecord {
            id: r.id,
            professor_id: r.professor_id,
            status: r.status,
        }))
    }

    async fn find_reviews(&self, review_ids: &[i32]) -> Result<Vec<ReviewRecord>, CoreError> {
        let rows = reviews::Entity::find()
            .filter(reviews::Column::Id.is_in(review_ids.to_vec()))
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| ReviewRecord {
                id: r.id,
                professor_id: r.professor_id,
                status: r.status,
            })
            .collect())
    }

    async fn set_review_status(
        &self,
        review_id: i32,
        status: ReviewStatus,
    ) -> Result<(), CoreError> {
        reviews::Entity::update_many()
            .col_expr(reviews::Column::Status, Expr::value(status.as_str()))
            .col_expr(
                reviews::Column::UpdatedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(reviews::Column::Id.eq(review_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn set_review_status_bulk(
        &self,
        review_ids: &[i32],
        status: ReviewStatus,
    ) -> Result<u64, CoreError> {
        let result = reviews::Entity::update_many()
            .col_expr(reviews::Column::Status, Expr::value(status.as_str()))
            .col_expr(
                reviews::Column::UpdatedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(reviews::Column::Id.is_in(review_ids.to_vec()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn set_review_status_if(
        &self,
        review_id: i32,
        expected: ReviewStatus,
        status: ReviewStatus,
    ) -> Result<bool, CoreError> {
        let result = reviews::Entity::update_many()
            .col_expr(reviews::Column::Status, Expr::value(status.as_str()))
            .col_expr(
                reviews::Column::UpdatedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(reviews::Column::Id.eq(review_id))
            .filter(reviews::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_report(
        &self,
        review_id: i32,
        reason: ReportReason,
        detail: Option<String>,
    ) -> Result<(), CoreError> {
        let report = reports::ActiveModel {
            review_id: Set(review_id),
            reason: Set(reason.as_str().to_string()),
            detail: Set(detail),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        report.insert(&self.db).await?;
        Ok(())
    }

    async fn count_reports(&self, review_id: i32) -> Result<u64, CoreError> {
        let count = reports::Entity::find()
            .filter(reports::Column::ReviewId.eq(review_id))
            .count(&self.db)
            .await?;
        Ok(count as u64)
    }

    async fn refresh_professor_aggregates(&self, professor_id: i32) -> Result<(), CoreError> {
        let live = reviews::Entity::find()
            .filter(reviews::Column::ProfessorId.eq(professor_id))
            .filter(reviews::Column::Status.eq(ReviewStatus::Live.as_str()))
            .all(&self.db)
            .await?;

        let summary = summarize_reviews(&live);

        let active = professor_aggregates::ActiveModel {
            professor_id: Set(professor_id),
            review_count: Set(summary.review_count),
            avg_quality: Set(summary.avg_quality),
            avg_difficulty: Set(summary.avg_difficulty),
            would_take_again_pct: Set(summary.would_take_again_pct),
            rating_distribution: Set(summary.rating_distribution),
            tag_counts: Set(summary.tag_counts),
            updated_at: Set(Utc::now().naive_utc()),
        };

        // Single-statement upsert: concurrent recomputes for the same
        // professor must not race a select-then-insert branch
        professor_aggregates::Entity::insert(active)
            .on_conflict(
                OnConflict::column(professor_aggregates::Column::ProfessorId)
                    .update_columns([
                        professor_aggregates::Column::ReviewCount,
                        professor_aggregates::Column::AvgQuality,
                        professor_aggregates::Column::AvgDifficulty,
                        professor_aggregates::Column::WouldTakeAgainPct,
                        professor_aggregates::Column::RatingDistribution,
                        professor_aggregates::Column::TagCounts,
                        professor_aggregates::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn refresh_trending(&self) -> Result<(), CoreError> {
        let cutoff = (Utc::now() - Duration::days(TRENDING_WINDOW_DAYS)).naive_utc();
        let recent = reviews::Entity::find()
            .filter(reviews::Column::Status.eq(ReviewStatus::Live.as_str()))
            .filter(reviews::Column::CreatedAt.gte(cutoff))
            .all(&self.db)
            .await?;

        let mut counts: std::collections::BTreeMap<i32, i32> = std::collections::BTreeMap::new();
        for review in &recent {
            *counts.entry(review.professor_id).or_insert(0) += 1;
        }

        let now = Utc::now().naive_utc();

        // Full rebuild: drop stale rows, then write the fresh projection
        trending_professors::Entity::delete_many()
            .exec(&self.db)
            .await?;

        for (professor_id, recent_reviews) in counts {
            let row = trending_professors::ActiveModel {
                professor_id: Set(professor_id),
                recent_reviews: Set(recent_reviews),
                computed_at: Set(now),
            };
            row.insert(&self.db).await?;
        }

        Ok(())
    }
}

/// Computed aggregate values for one professor.
struct ReviewSummary {
    review_count: i32,
    avg_quality: f32,
    avg_difficulty: f32,
    would_take_again_pct: Option<f32>,
    rating_distribution: serde_json::Value,
    tag_counts: serde_json::Value,
}

/// Pure reduction of a professor's live reviews into aggregate values.
fn summarize_reviews(live: &[reviews::Model]) -> ReviewSummary {
    let count = live.len();
    if count == 0 {
        return ReviewSummary {
            review_count: 0,
            avg_quality: 0.0,
            avg_difficulty: 0.0,
            would_take_again_pct: None,
            rating_distribution: empty_distribution(),
            tag_counts: serde_json::Value::Object(serde_json::Map::new()),
        };
    }

    let avg_quality =
        live.iter().map(|r| r.rating_quality).sum::<f32>() / count as f32;
    let avg_difficulty =
        live.iter().map(|r| r.rating_difficulty).sum::<f32>() / count as f32;

    let answered: Vec<bool> = live.iter().filter_map(|r| r.would_take_again).collect();
    let would_take_again_pct = if answered.is_empty() {
        None
    } else {
        let yes = answered.iter().filter(|&&v| v).count();
        Some(yes as f32 / answered.len() as f32 * 100.0)
    };

    let mut buckets = [0i64; 5];
    for review in live {
        let bucket = (review.rating_quality.round() as i64).clamp(1, 5);
        buckets[(bucket - 1) as usize] += 1;
    }
    let mut distribution = serde_json::Map::new();
    for (i, n) in buckets.iter().enumerate() {
        distribution.insert((i + 1).to_string(), serde_json::Value::from(*n));
    }

    let mut tag_counts: std::collections::BTreeMap<String, i64> =
        std::collections::BTreeMap::new();
    for review in live {
        if let Some(tags) = review.tags.as_array() {
            for tag in tags.iter().filter_map(|t| t.as_str()) {
                *tag_counts.entry(tag.to_string()).or_insert(0) += 1;
            }
        }
    }
    let tag_counts = serde_json::Value::Object(
        tag_counts
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::from(v)))
            .collect(),
    );

    ReviewSummary {
        review_count: count as i32,
        avg_quality,
        avg_difficulty,
        would_take_again_pct,
        rating_distribution: serde_json::Value::Object(distribution),
        tag_counts,
    }
}

fn empty_distribution() -> serde_json::Value {
    let mut distribution = serde_json::Map::new();
    for bucket in 1..=5 {
        distribution.insert(bucket.to_string(), serde_json::Value::from(0));
    }
    serde_json::Value::Object(distribution)
}
