//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations for the
//! session and tenant tables.

pub mod session;
pub mod tenant;

pub use session::SessionRepository;
pub use tenant::{TenantDirectory, TenantRepository};
