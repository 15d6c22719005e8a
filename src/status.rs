//! Review status state machine primitives
//!
//! The status enum doubles as the persisted column type (exact string
//! values, case-sensitive) and carries the explicit severity ordering used
//! when two subsystems disagree about how bad a submission is.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Visibility state of a review.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Awaiting first moderator look. The default landing state.
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Needs priority moderator attention.
    #[sea_orm(string_value = "flagged")]
    Flagged,
    /// Publicly visible, counted in aggregates.
    #[sea_orm(string_value = "live")]
    Live,
    /// Visible to its author only, excluded from aggregates and listings.
    #[sea_orm(string_value = "shadow")]
    Shadow,
    /// Failed content policy or moderator-rejected. Never row-deleted.
    #[sea_orm(string_value = "removed")]
    Removed,
}

impl ReviewStatus {
    /// Explicit severity rank: `removed > flagged > pending`.
    ///
    /// Visibility states sit below the moderation states so that an
    /// override can only ever tighten a verdict, never loosen one.
    fn severity_rank(self) -> u8 {
        match self {
            ReviewStatus::Live => 0,
            ReviewStatus::Shadow => 1,
            ReviewStatus::Pending => 2,
            ReviewStatus::Flagged => 3,
            ReviewStatus::Removed => 4,
        }
    }

    /// The more severe of two statuses.
    pub fn max_severity(self, other: Self) -> Self {
        if other.severity_rank() > self.severity_rank() {
            other
        } else {
            self
        }
    }

    /// The exact persisted string literal.
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Flagged => "flagged",
            ReviewStatus::Live => "live",
            ReviewStatus::Shadow => "shadow",
            ReviewStatus::Removed => "removed",
        }
    }
}

impl PartialOrd for ReviewStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReviewStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.severity_rank().cmp(&other.severity_rank())
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A moderator action. Every action maps to exactly one target status and is
/// applicable from any current status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
    Shadow,
    Flag,
}

impl ModerationAction {
    /// Target status of this action.
    pub fn target_status(self) -> ReviewStatus {
        match self {
            ModerationAction::Approve => ReviewStatus::Live,
            ModerationAction::Reject => ReviewStatus::Removed,
            ModerationAction::Shadow => ReviewStatus::Shadow,
            ModerationAction::Flag => ReviewStatus::Flagged,
        }
    }
}

/// Role attached to an authenticated admin user.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActorRole {
    /// Read-mostly staff account. Can work the queue one item at a time.
    Support,
    Moderator,
    SuperAdmin,
}

impl ActorRole {
    /// Parse the role column of an admin user row.
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "support" => Some(ActorRole::Support),
            "moderator" => Some(ActorRole::Moderator),
            "super_admin" => Some(ActorRole::SuperAdmin),
            _ => None,
        }
    }

    /// Whether this role may apply single-item moderation actions.
    pub fn can_moderate(self) -> bool {
        matches!(
            self,
            ActorRole::Support | ActorRole::Moderator | ActorRole::SuperAdmin
        )
    }

    /// Whether this role may apply bulk moderation actions.
    pub fn can_bulk_moderate(self) -> bool {
        matches!(self, ActorRole::Moderator | ActorRole::SuperAdmin)
    }
}

/// Reason attached to a user-submitted report.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportReason {
    Spam,
    Offensive,
    Inaccurate,
    Doxxing,
    Other,
}

impl ReportReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportReason::Spam => "spam",
            ReportReason::Offensive => "offensive",
            ReportReason::Inaccurate => "inaccurate",
            ReportReason::Doxxing => "doxxing",
            ReportReason::Other => "other",
        }
    }
}
