//! Review submission endpoint

use actix_web::{post, web, Error, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::db::get_db_pool;
use crate::guard::GuardPolicy;
use crate::identity;
use crate::orm::reviews::GradeReceived;
use crate::pipeline::{self, ReviewCandidate};
use crate::status::ReviewStatus;
use crate::store::SeaOrmStore;
use crate::throttle::Throttle;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(submit_review);
}

#[derive(Deserialize)]
struct SubmitReviewRequest {
    professor_id: i32,
    course_id: i32,
    rating_quality: f32,
    rating_difficulty: f32,
    would_take_again: Option<bool>,
    attendance_mandatory: Option<bool>,
    uses_textbook: Option<bool>,
    grade_received: Option<GradeReceived>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    comment: String,
}

#[derive(Serialize)]
struct SubmitReviewResponse {
    review_id: i32,
    status: ReviewStatus,
    points_earned: u32,
    message: &'static str,
}

/// Submit a new review.
///
/// The anonymous identity comes from the `x-anon-user-hash` header; the
/// server never sees a login. IP and user agent are one-way hashed before
/// anything touches the store.
#[post("/api/reviews")]
async fn submit_review(
    req: HttpRequest,
    throttle: web::Data<Throttle>,
    payload: web::Json<SubmitReviewRequest>,
) -> Result<HttpResponse, Error> {
    let ip = identity::extract_client_ip(&req).unwrap_or_default();

    if let Err(err) = throttle.check_submission(&ip) {
        return Ok(HttpResponse::TooManyRequests()
            .append_header(("Retry-After", err.retry_after_seconds.to_string()))
            .json(serde_json::json!({
                "error": "Too many requests. Slow down."
            })));
    }

    let anon_user_hash = req
        .headers()
        .get("x-anon-user-hash")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let payload = payload.into_inner();
    let candidate = ReviewCandidate {
        professor_id: payload.professor_id,
        course_id: payload.course_id,
        anon_user_hash,
        ip_hash: identity::fingerprint_with_config(&ip),
        user_agent_hash: identity::fingerprint_with_config(user_agent),
        rating_quality: payload.rating_quality,
        rating_difficulty: payload.rating_difficulty,
        would_take_again: payload.would_take_again,
        attendance_mandatory: payload.attendance_mandatory,
        uses_textbook: payload.uses_textbook,
        grade_received: payload.grade_received,
        tags: payload.tags,
        comment: payload.comment,
    };

    let store = SeaOrmStore::new(get_db_pool().clone());
    let policy = GuardPolicy::from_config();
    let outcome = pipeline::submit(&store, &policy, candidate).await?;

    let message = match outcome.status {
        ReviewStatus::Removed => "Your review could not be published.",
        _ => "Review submitted. It will appear after moderation.",
    };

    Ok(HttpResponse::Created().json(SubmitReviewResponse {
        review_id: outcome.review_id,
        status: outcome.status,
        points_earned: outcome.points_earned,
        message,
    }))
}
