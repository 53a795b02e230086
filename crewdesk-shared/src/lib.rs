//! # CrewDesk Shared Library
//!
//! This crate contains the models, authorization core, and database layer
//! shared by the CrewDesk API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, projects, memberships, tasks)
//! - `auth`: Credential verification and the authorization decision
//!   procedure
//! - `db`: Connection pooling and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the CrewDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
