//! Moderation endpoints for staff accounts
//!
//! Authentication is a shared secret plus a staff email in the bearer token:
//! `Authorization: Bearer <secret>:<email>`. The email must map to an
//! admin_users row; its role column decides what the caller may do. An empty
//! configured secret disables the whole admin surface.

use actix_web::{get, post, put, web, Error, HttpRequest, HttpResponse};
use sea_orm::{query::*, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::app_config;
use crate::db::get_db_pool;
use crate::error::CoreError;
use crate::moderation;
use crate::orm::{admin_users, reviews};
use crate::status::{ActorRole, ModerationAction, ReviewStatus};
use crate::store::SeaOrmStore;

/// Reviews returned per moderation queue page.
const MOD_QUEUE_PAGE_SIZE: u64 = 100;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(review_action)
        .service(bulk_review_action)
        .service(mod_queue);
}

/// Resolve the caller's role from the Authorization header.
async fn authenticate_admin(req: &HttpRequest) -> Result<(ActorRole, String), CoreError> {
    let secret = app_config::get().admin.secret;
    if secret.is_empty() {
        return Err(CoreError::Forbidden);
    }

    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(CoreError::Forbidden)?;

    let (provided_secret, email) = token.split_once(':').ok_or(CoreError::Forbidden)?;
    if provided_secret != secret {
        return Err(CoreError::Forbidden);
    }

    let account = admin_users::Entity::find()
        .filter(admin_users::Column::Email.eq(email))
        .one(get_db_pool())
        .await?
        .ok_or(CoreError::Forbidden)?;

    let role = ActorRole::parse(&account.role).ok_or(CoreError::Forbidden)?;
    Ok((role, account.email))
}

#[derive(Deserialize)]
struct ReviewActionRequest {
    review_id: i32,
    action: ModerationAction,
}

#[derive(Serialize)]
struct ReviewActionResponse {
    review_id: i32,
    old_status: ReviewStatus,
    new_status: ReviewStatus,
}

/// Apply one moderation action to one review.
#[post("/api/admin/review-action")]
async fn review_action(
    req: HttpRequest,
    payload: web::Json<ReviewActionRequest>,
) -> Result<HttpResponse, Error> {
    let (role, email) = authenticate_admin(&req).await?;

    let store = SeaOrmStore::new(get_db_pool().clone());
    let outcome =
        moderation::apply_action(&store, role, payload.review_id, payload.action).await?;

    log::info!(
        "Admin {} applied {:?} to review {}",
        email,
        payload.action,
        payload.review_id
    );

    Ok(HttpResponse::Ok().json(ReviewActionResponse {
        review_id: outcome.review_id,
        old_status: outcome.old_status,
        new_status: outcome.new_status,
    }))
}

#[derive(Deserialize)]
struct BulkReviewActionRequest {
    review_ids: Vec<i32>,
    action: ModerationAction,
}

#[derive(Serialize)]
struct BulkReviewActionResponse {
    updated_count: u64,
    affected_professor_count: usize,
}

/// Apply one moderation action uniformly to a set of reviews.
#[put("/api/admin/review-action")]
async fn bulk_review_action(
    req: HttpRequest,
    payload: web::Json<BulkReviewActionRequest>,
) -> Result<HttpResponse, Error> {
    let (role, email) = authenticate_admin(&req).await?;

    let store = SeaOrmStore::new(get_db_pool().clone());
    let outcome =
        moderation::apply_bulk_action(&store, role, &payload.review_ids, payload.action).await?;

    log::info!(
        "Admin {} applied bulk {:?} to {} reviews",
        email,
        payload.action,
        outcome.updated_count
    );

    Ok(HttpResponse::Ok().json(BulkReviewActionResponse {
        updated_count: outcome.updated_count,
        affected_professor_count: outcome.affected_professor_count,
    }))
}

#[derive(Deserialize)]
struct ModQueueQuery {
    /// "pending" (default) or "flagged".
    status: Option<String>,
}

#[derive(Serialize)]
struct ModQueueItem {
    review_id: i32,
    professor_id: i32,
    course_id: i32,
    status: ReviewStatus,
    toxicity_score: f32,
    risk_flags: serde_json::Value,
    comment: String,
    created_at: chrono::NaiveDateTime,
}

/// Reviews awaiting moderation, oldest first. Flagged reviews are served
/// from the same endpoint with `?status=flagged`.
#[get("/api/admin/mod-queue")]
async fn mod_queue(
    req: HttpRequest,
    query: web::Query<ModQueueQuery>,
) -> Result<HttpResponse, Error> {
    authenticate_admin(&req).await?;

    let status = match query.status.as_deref() {
        None | Some("pending") => ReviewStatus::Pending,
        Some("flagged") => ReviewStatus::Flagged,
        Some(other) => {
            return Err(CoreError::Validation(format!(
                "Unknown queue status: {}",
                other
            ))
            .into())
        }
    };

    let rows = reviews::Entity::find()
        .filter(reviews::Column::Status.eq(status.as_str()))
        .order_by_asc(reviews::Column::CreatedAt)
        .limit(MOD_QUEUE_PAGE_SIZE)
        .all(get_db_pool())
        .await
        .map_err(CoreError::from)?;

    let items: Vec<ModQueueItem> = rows
        .into_iter()
        .map(|r| ModQueueItem {
            review_id: r.id,
            professor_id: r.professor_id,
            course_id: r.course_id,
            status: r.status,
            toxicity_score: r.toxicity_score,
            risk_flags: r.risk_flags,
            comment: r.comment,
            created_at: r.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(items))
}
