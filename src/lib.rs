//! Bagyo library
//!
//! Data pipeline for typhoon, earthquake, and low-pressure-area tracking
//! around the Philippine Area of Responsibility, exposed for the CLI binary
//! and integration tests.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod data;
pub mod geo;
pub mod names;
pub mod report;
