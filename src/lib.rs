//! # ShipStack API Library
//!
//! Multi-tenant request pipeline: session lookup, tenant identification and
//! resolution, path normalization and tiered access control, plus the HTTP
//! server that ties them together.

pub mod access;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod tenant;
pub use migration;

#[cfg(test)]
mod test_support;
