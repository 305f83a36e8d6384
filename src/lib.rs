//! Product Catalog Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
/// Product domain: models, validation and the product service
pub mod catalog;
pub mod config;
pub mod error;
/// Shared handler state
pub mod state;
pub mod storage;
