//! # CrewDesk API Server Library
//!
//! This library provides the core functionality for the CrewDesk API
//! server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `response`: Success response envelope
//! - `patch`: Three-way optional fields for update requests
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod patch;
pub mod response;
pub mod routes;
