pub mod admin;
pub mod analytics;
pub mod auth;
pub mod health;
pub mod planner;
pub mod schedules;
pub mod stores;
