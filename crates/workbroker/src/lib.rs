//! Core library for the work brokerage: domain model, lifecycle services,
//! and collaborator ports, plus the axum routers the API service mounts.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
