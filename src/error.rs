//! Error types for the Mailchimp MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Mailchimp MCP Server
#[derive(Error, Debug)]
pub enum MailchimpMcpError {
    /// Mailchimp API errors
    #[error("Mailchimp API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the Mailchimp HTTP client once its retry budget is spent
#[derive(Error, Debug)]
pub enum ApiError {
    /// Every attempt was answered with 429
    #[error("Rate limit exceeded: {body}")]
    RateLimitExceeded { body: String },

    /// Every attempt was answered with a 5xx
    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    /// Any other non-2xx response; never retried
    #[error("API request failed ({status}): {body}")]
    RequestFailed { status: u16, body: String },

    /// Connection refused, reset, DNS failure, timeout
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body was not valid JSON
    #[error("Invalid JSON in response: {message}")]
    InvalidJson { message: String },
}

impl ApiError {
    /// HTTP status of the terminal response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RateLimitExceeded { .. } => Some(429),
            ApiError::ServerError { status, .. } | ApiError::RequestFailed { status, .. } => {
                Some(*status)
            }
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidJson { .. } => None,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid parameter: {name} - {message}")]
    InvalidParameter { name: String, message: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },
}

/// Result type alias for Mailchimp MCP operations
pub type Result<T> = std::result::Result<T, MailchimpMcpError>;

impl From<reqwest::Error> for MailchimpMcpError {
    fn from(err: reqwest::Error) -> Self {
        MailchimpMcpError::Api(ApiError::Network(err))
    }
}
