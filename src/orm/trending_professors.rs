//! SeaORM Entity for trending_professors table
//!
//! Secondary best-effort projection of recent live review volume. Rebuilt
//! wholesale; failures here never fail the operation that triggered them.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trending_professors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub professor_id: i32,
    /// Live reviews created within the trending window.
    pub recent_reviews: i32,
    pub computed_at: chrono::NaiveDateTime,
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
