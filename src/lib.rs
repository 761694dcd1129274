//! Mailchimp MCP Server Library
//!
//! A Model Context Protocol (MCP) server for the Mailchimp Marketing API.
//! Provides tools for reading audiences, members, campaigns and reports,
//! plus opt-in tools that change account data.

pub mod config;
pub mod error;
pub mod mailchimp;
pub mod mcp;
pub mod metrics;

pub use config::Config;
pub use error::{MailchimpMcpError, Result};
