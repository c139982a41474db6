//! services/api/src/lib.rs
//!
//! The HTTP gateway for document Q&A: configuration, the adapters that
//! implement the core ports, and the Axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
