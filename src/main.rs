//! Mailchimp MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server for the Mailchimp Marketing API,
//! served over stdio or HTTP with Server-Sent Events.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use mailchimp_mcp_server_rust::config::{Config, TransportMode};
use mailchimp_mcp_server_rust::mailchimp::client::MailchimpClient;
use mailchimp_mcp_server_rust::mcp::server::{McpServer, ToolErrorStyle};
use mailchimp_mcp_server_rust::mcp::sse;
use mailchimp_mcp_server_rust::mcp::tools::{tool_definitions, MailchimpTools};
use mailchimp_mcp_server_rust::metrics::ToolMetrics;

/// Mailchimp MCP Server
#[derive(Parser)]
#[command(name = "mailchimp-mcp-server")]
#[command(author, version, about = "Mailchimp MCP Server - A Model Context Protocol server for Mailchimp")]
struct Cli {
    /// Serve HTTP + SSE instead of stdio
    #[arg(long)]
    sse: bool,

    /// Port for the SSE transport
    #[arg(long)]
    port: Option<u16>,

    /// Bind address for the SSE transport
    #[arg(long)]
    host: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tool descriptors as JSON and exit
    Tools {
        /// Include the tools that change account data
        #[arg(long)]
        writes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Tools { writes }) = cli.command {
        let tools = tool_definitions(writes);
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.sse {
        config.transport = TransportMode::Sse;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }

    run_server(config).await
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        data_center = %config.data_center,
        writes_enabled = config.writes_enabled,
        transport = ?config.transport,
        "Starting Mailchimp MCP server"
    );

    let client = Arc::new(MailchimpClient::new(&config).context("failed to build Mailchimp client")?);
    tracing::debug!(base_url = %client.base_url(), "Mailchimp client ready");
    let tools = MailchimpTools::new(client, config.writes_enabled);
    let metrics = Arc::new(ToolMetrics::new());

    match config.transport {
        TransportMode::Stdio => {
            let server = Arc::new(McpServer::new(tools, metrics, ToolErrorStyle::Content));
            server.run_stdio().await?;
        }
        TransportMode::Sse => {
            let server = Arc::new(McpServer::new(tools, metrics, ToolErrorStyle::Envelope));
            sse::serve(server, &config).await?;
        }
    }

    Ok(())
}
