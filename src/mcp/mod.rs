//! MCP (Model Context Protocol) module
//!
//! JSON-RPC routing over two transports: line-delimited stdio and
//! HTTP with Server-Sent Events.

pub mod server;
pub mod sse;
pub mod tools;
pub mod types;
