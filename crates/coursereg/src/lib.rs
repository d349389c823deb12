//! Course registration API: course management for administrators and
//! conflict-aware registration for students.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod registration;
pub mod schedule;
pub mod server;
pub mod types;
