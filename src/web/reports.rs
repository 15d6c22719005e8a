//! Report submission endpoint

use actix_web::{post, web, Error, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::db::get_db_pool;
use crate::escalation;
use crate::identity;
use crate::status::ReportReason;
use crate::store::SeaOrmStore;
use crate::throttle::Throttle;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(submit_report);
}

#[derive(Deserialize)]
struct SubmitReportRequest {
    review_id: i32,
    reason: ReportReason,
    detail: Option<String>,
}

#[derive(Serialize)]
struct SubmitReportResponse {
    message: &'static str,
}

/// Report a live review. The response never reveals whether the report
/// tripped an escalation.
#[post("/api/reports")]
async fn submit_report(
    req: HttpRequest,
    throttle: web::Data<Throttle>,
    payload: web::Json<SubmitReportRequest>,
) -> Result<HttpResponse, Error> {
    let ip = identity::extract_client_ip(&req).unwrap_or_default();

    if let Err(err) = throttle.check_report(&ip) {
        return Ok(HttpResponse::TooManyRequests()
            .append_header(("Retry-After", err.retry_after_seconds.to_string()))
            .json(serde_json::json!({
                "error": "Too many reports. Slow down."
            })));
    }

    let store = SeaOrmStore::new(get_db_pool().clone());
    escalation::submit_report(
        &store,
        payload.review_id,
        payload.reason,
        payload.detail.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(SubmitReportResponse {
        message: "Report submitted. Thank you for helping keep reviews trustworthy.",
    }))
}
