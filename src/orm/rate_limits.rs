//! SeaORM Entity for rate_limits table
//!
//! Append-only submission events. One row is written per accepted submission
//! attempt; rows are only ever counted within a sliding window, never read
//! individually or updated.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rate_limits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub anon_user_hash: String,
    pub ip_hash: String,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
