//! Model Context Protocol (MCP) server handling and JSON-RPC implementations
//!
//! Provides the JSON-RPC envelope, method routing, and capability negotiation.

pub mod rpc;
pub mod server;
