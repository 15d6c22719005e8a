//! SeaORM Entity for reviews table
//!
//! A review is created once by the admission pipeline and never deleted;
//! removal is a status transition, not a row deletion. The anti-abuse columns
//! hold one-way fingerprint hashes, never raw values.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::status::ReviewStatus;

/// Grade the reviewer reports receiving, including withdrawal and
/// in-progress markers. The serde names match the persisted strings.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(2))")]
pub enum GradeReceived {
    #[sea_orm(string_value = "A+")]
    #[serde(rename = "A+")]
    APlus,
    #[sea_orm(string_value = "A")]
    #[serde(rename = "A")]
    A,
    #[sea_orm(string_value = "A-")]
    #[serde(rename = "A-")]
    AMinus,
    #[sea_orm(string_value = "B+")]
    #[serde(rename = "B+")]
    BPlus,
    #[sea_orm(string_value = "B")]
    #[serde(rename = "B")]
    B,
    #[sea_orm(string_value = "B-")]
    #[serde(rename = "B-")]
    BMinus,
    #[sea_orm(string_value = "C+")]
    #[serde(rename = "C+")]
    CPlus,
    #[sea_orm(string_value = "C")]
    #[serde(rename = "C")]
    C,
    #[sea_orm(string_value = "C-")]
    #[serde(rename = "C-")]
    CMinus,
    #[sea_orm(string_value = "D+")]
    #[serde(rename = "D+")]
    DPlus,
    #[sea_orm(string_value = "D")]
    #[serde(rename = "D")]
    D,
    #[sea_orm(string_value = "F")]
    #[serde(rename = "F")]
    F,
    /// Withdrew from the course
    #[sea_orm(string_value = "W")]
    #[serde(rename = "W")]
    Withdrawal,
    /// Course still in progress
    #[sea_orm(string_value = "IP")]
    #[serde(rename = "IP")]
    InProgress,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub professor_id: i32,
    pub course_id: i32,
    pub university_id: i32,
    /// Client-derived anonymous fingerprint, one-way hashed.
    pub anon_user_hash: String,
    /// Quality and difficulty, 0.5 to 5.0 in 0.5 increments.
    pub rating_quality: f32,
    pub rating_difficulty: f32,
    /// Tri-states: None means the reviewer did not answer.
    pub would_take_again: Option<bool>,
    pub attendance_mandatory: Option<bool>,
    pub uses_textbook: Option<bool>,
    pub grade_received: Option<GradeReceived>,
    /// Ordered JSON array of tags from the controlled vocabulary.
    pub tags: Json,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub status: ReviewStatus,
    pub toxicity_score: f32,
    /// JSON object of named boolean risk flags set by the scanner/guard.
    pub risk_flags: Json,
    pub ip_hash: String,
    pub user_agent_hash: String,
    /// Derived label, e.g. "2025-fall". Scopes the duplicate rule.
    pub semester_window: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::professors::Entity",
        from = "Column::ProfessorId",
        to = "super::professors::Column::Id"
    )]
    Professor,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::universities::Entity",
        from = "Column::UniversityId",
        to = "super::universities::Column::Id"
    )]
    University,
    #[sea_orm(has_many = "super::reports::Entity")]
    Reports,
}

impl Related<super::professors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professor.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
