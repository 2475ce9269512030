//! Perkons CLI - compile and submit workflow pipelines.
//!
//! The binary wires the built-in pipeline definitions to the compiler and
//! the submission client. The modules live in a library crate so
//! integration tests can drive them directly.

pub mod api;
pub mod client;
pub mod config;
pub mod pipelines;
