//! Mailchimp API module
//!
//! Contains the retry policy and the HTTP client for the Mailchimp Marketing API.

pub mod client;
pub mod retry;
