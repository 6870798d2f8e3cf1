//! HTTP Transport layer for the Model Context Protocol
//!
//! Provides the `/mcp` endpoint in both its event-stream and request/response forms,
//! plus the health probe.

pub mod events;
pub mod handlers;
