//! Application-wide constants
//!
//! Numeric policy knobs have config overrides (see `app_config`); the values
//! here are the defaults. The tag vocabulary is fixed at compile time.

use phf::phf_set;

/// Maximum length for a review comment in characters.
/// Longer comments are truncated, not rejected.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Maximum number of tags kept on a single review.
pub const MAX_TAGS: usize = 3;

/// Maximum length for report detail text in characters.
pub const MAX_REPORT_DETAIL_LENGTH: usize = 500;

/// Minimum length of the anonymous-user fingerprint hash.
/// Anything shorter is treated as a forged or missing identity token.
pub const MIN_ANON_HASH_LENGTH: usize = 8;

/// Store-backed submission caps.
pub const MAX_REVIEWS_PER_USER_DAY: u64 = 10;
pub const MAX_REVIEWS_PER_IP_HOUR: u64 = 5;

/// Brigading heuristic: this many reviews for one professor inside the
/// window marks further submissions as suspect.
pub const BRIGADE_THRESHOLD: u64 = 5;
pub const BRIGADE_WINDOW_SECS: i64 = 300;

/// Reports against a live review before it is auto-flagged.
pub const REPORT_ESCALATION_THRESHOLD: u64 = 3;

/// Upper bound on ids accepted by a bulk moderation action.
pub const MAX_BULK_ACTION_IDS: usize = 50;

/// Bulk actions at or above this size also refresh the trending projection.
pub const TRENDING_REFRESH_BATCH_SIZE: usize = 5;

/// Controlled vocabulary for review tags. Submitted tags outside this set
/// are dropped silently.
pub static VALID_TAGS: phf::Set<&'static str> = phf_set! {
    "Tough Grader",
    "Clear Lectures",
    "Caring",
    "Gives Good Feedback",
    "Lots of Homework",
    "Amazing Lectures",
    "Get Ready to Read",
    "Inspirational",
    "Group Projects",
    "Hilarious",
    "Skip Class? You Won't Pass",
    "Graded by Few Things",
    "Test Heavy",
    "Extra Credit",
    "Accessible Outside Class",
};
