//! # assist
//!
//! `assist` serves the user-facing account pages of a community support
//! site: public profiles, profile and avatar editing, notification
//! settings, and the handoff to an external identity provider.

pub mod assist_db;
pub mod error;
pub mod forms;
pub mod server;
pub mod users;
