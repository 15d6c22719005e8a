pub mod app_config;
pub mod constants;
pub mod db;
pub mod error;
pub mod escalation;
pub mod guard;
pub mod identity;
pub mod moderation;
pub mod orm;
pub mod pipeline;
pub mod sanitize;
pub mod scanner;
pub mod semester;
pub mod status;
pub mod store;
pub mod throttle;
pub mod web;
