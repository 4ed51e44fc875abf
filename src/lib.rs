//! Plan Compass - Conversational health-plan assistant.
//!
//! Collects search criteria ("entities") across conversation turns,
//! then delegates to an external search service and summarizes the
//! results.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
