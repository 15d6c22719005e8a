//! Test fixtures for creating test data
#![allow(dead_code)]

use chrono::Utc;
use std::collections::BTreeSet;

use taqyeem::guard::GuardPolicy;
use taqyeem::pipeline::ReviewCandidate;
use taqyeem::semester;
use taqyeem::status::ReviewStatus;
use taqyeem::store::NewReview;

pub const PROFESSOR_ID: i32 = 1;
pub const UNIVERSITY_ID: i32 = 7;
pub const COURSE_ID: i32 = 10;

/// Guard limits loose enough that only the law under test can trip.
pub fn test_policy() -> GuardPolicy {
    GuardPolicy {
        max_reviews_per_user_day: 10,
        max_reviews_per_ip_hour: 5,
        brigade_threshold: 5,
        brigade_window_secs: 300,
    }
}

/// A well-formed, inoffensive submission.
pub fn clean_candidate(anon_user_hash: &str) -> ReviewCandidate {
    ReviewCandidate {
        professor_id: PROFESSOR_ID,
        course_id: COURSE_ID,
        anon_user_hash: anon_user_hash.to_string(),
        ip_hash: format!("ip-of-{}", anon_user_hash),
        user_agent_hash: "ua-hash-fixture".to_string(),
        rating_quality: 4.5,
        rating_difficulty: 3.0,
        would_take_again: Some(true),
        attendance_mandatory: None,
        uses_textbook: Some(false),
        grade_received: None,
        tags: vec!["Caring".to_string()],
        comment: "Great lectures and fair exams throughout the term.".to_string(),
    }
}

/// A pre-existing stored review row for seeding.
pub fn seeded_review(anon_user_hash: &str, professor_id: i32, status: ReviewStatus) -> NewReview {
    let now = Utc::now();
    NewReview {
        professor_id,
        course_id: COURSE_ID,
        university_id: UNIVERSITY_ID,
        anon_user_hash: anon_user_hash.to_string(),
        ip_hash: format!("ip-of-{}", anon_user_hash),
        user_agent_hash: "ua-hash-fixture".to_string(),
        rating_quality: 3.0,
        rating_difficulty: 3.0,
        would_take_again: None,
        attendance_mandatory: None,
        uses_textbook: None,
        grade_received: None,
        tags: vec![],
        comment: "Seeded review body.".to_string(),
        status,
        toxicity_score: 0.0,
        risk_flags: BTreeSet::new(),
        semester_window: semester::semester_window(now),
        created_at: now.naive_utc(),
    }
}
