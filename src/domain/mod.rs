//! Tool registry and health reporting
//!
//! The protocol-facing catalog of tools and the storage-backed health check.

pub mod health;
pub mod tools;
