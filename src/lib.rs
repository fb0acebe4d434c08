pub mod api;
pub mod config;
pub mod course_stats;
pub mod error;
pub mod output;
pub mod report;
pub mod service;
pub mod sources;
