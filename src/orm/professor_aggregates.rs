//! SeaORM Entity for professor_aggregates table
//!
//! Read-side projection rebuilt in full from currently-live reviews whenever
//! a review enters or leaves visibility. Safe to recompute concurrently.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "professor_aggregates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub professor_id: i32,
    pub review_count: i32,
    pub avg_quality: f32,
    pub avg_difficulty: f32,
    /// Percentage of answered would-take-again responses that were yes.
    /// Null when no review answered the question.
    pub would_take_again_pct: Option<f32>,
    /// JSON object mapping rounded quality bucket ("1".."5") to count.
    pub rating_distribution: Json,
    /// JSON object mapping tag to occurrence count across live reviews.
    pub tag_counts: Json,
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
}

impl Related<super::professors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
