//! SeaORM entities, one module per table.

pub mod admin_users;
pub mod courses;
pub mod professor_aggregates;
pub mod professors;
pub mod rate_limits;
pub mod reports;
pub mod reviews;
pub mod trending_professors;
pub mod universities;
