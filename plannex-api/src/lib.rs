//! # Plannex API Server Library
//!
//! HTTP surface of the Plannex back-office: the user directory behind JWT
//! authentication, plus a public health check.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
