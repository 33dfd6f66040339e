//! Read-only reporting over employee and team event history.
//!
//! - [`db`]: per-call SQLite connections and the fixed query catalog
//! - [`views`]: employee/team views, event histories and feature vectors
//! - [`risk`]: recruitment-risk scoring with a pre-trained classifier
//! - [`report`]: dashboard data for one subject

pub mod cli;
pub mod config;
pub mod db;
pub mod report;
pub mod risk;
pub mod views;
