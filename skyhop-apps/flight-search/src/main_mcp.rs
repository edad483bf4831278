//!  Skyhop Flight Search
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Unified MCP Server Entry Point
//!
//! Supports stdio and streamable HTTP transports via subcommand.

use anyhow::{Context, Error, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rmcp::handler::server::{ServerHandler, tool::ToolRouter, wrapper::Parameters};
use rmcp::service::serve_server;
use rmcp::{tool, tool_handler, tool_router};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use skyhop_flight_search::{ApiConfig, ResultView, SearchRequest, SearchResponse, SkyhopClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "skyhop-mcp")]
#[command(author, version, about = "MCP server for multi-leg flight search")]
struct Args {
    /// Search backend base URL (defaults to the build-time address)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run MCP server over stdio (for Claude Desktop, etc.)
    Stdio,

    /// Run MCP server over HTTP
    Http {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value = "8080")]
        port: u16,
    },
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct FlightSearchInput {
    pub from: String,
    pub to: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_nights: Option<u32>,
}

#[derive(Serialize)]
struct FlightSearchOutput<'a> {
    request: &'a SearchRequest,
    view: ResultView,
    response: &'a SearchResponse,
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("Invalid {field}: {value}. Use YYYY-MM-DD"))
}

#[derive(Clone)]
pub struct SkyhopServer {
    client: Arc<SkyhopClient>,
    tool_router: ToolRouter<Self>,
}

impl SkyhopServer {
    pub fn new(client: Arc<SkyhopClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl SkyhopServer {
    #[tool(
        name = "search_flights",
        description = "Search the cheapest multi-leg itinerary between two airports within a travel window. Parameters: from (IATA), to (IATA), start_date (YYYY-MM-DD), end_date (YYYY-MM-DD, not before start_date), trip_nights (optional, at most the days between the dates). Returns the request, a rendered view (prices in KRW, trip span, savings against a direct flight) and the raw response."
    )]
    async fn search_flights(&self, params: Parameters<FlightSearchInput>) -> Result<String, String> {
        let input = params.0;
        let start_date = parse_date("start_date", &input.start_date)?;
        let end_date = parse_date("end_date", &input.end_date)?;

        let request = SearchRequest::new(
            &input.from,
            &input.to,
            start_date,
            end_date,
            input.trip_nights,
        )
        .map_err(|e| e.to_string())?;

        let response = self
            .client
            .search(&request)
            .await
            .map_err(|e| e.to_string())?;

        let output = FlightSearchOutput {
            request: &request,
            view: ResultView::from_response(&response),
            response: &response,
        };
        serde_json::to_string(&output).map_err(|e| e.to_string())
    }
}

#[tool_handler]
impl ServerHandler for SkyhopServer {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::V_2025_03_26,
            capabilities: rmcp::model::ServerCapabilities {
                tools: Some(rmcp::model::ToolsCapability::default()),
                ..Default::default()
            },
            server_info: rmcp::model::Implementation::from_build_env(),
            instructions: Some(
                "Cheapest multi-leg flight search. Airport codes are 3-letter IATA codes; \
                 prices are in KRW. Only one search runs at a time."
                    .to_string(),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".to_string().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();
    tracing::debug!("Parsed args: {:?}", args);

    let config = ApiConfig::resolve(args.api_url.as_deref()).context("Invalid --api-url")?;
    tracing::info!("Search endpoint: {}", config.search_url());
    let client = Arc::new(SkyhopClient::new(config).context("Failed to create search client")?);

    match args.command {
        Command::Stdio => {
            eprintln!("Starting MCP server over stdio...");
            let running = serve_server(SkyhopServer::new(client), rmcp::transport::io::stdio())
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
            let reason = running.waiting().await.context("MCP server task failed")?;
            tracing::info!("MCP server stopped: {:?}", reason);
        }
        Command::Http { host, port } => {
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .context("Invalid host:port")?;
            tracing::info!("Starting MCP server over HTTP on {}", addr);
            let server = SkyhopServer::new(client);
            let session_manager = Arc::new(LocalSessionManager::default());
            let config = StreamableHttpServerConfig {
                stateful_mode: true,
                ..Default::default()
            };
            let service =
                StreamableHttpService::new(move || Ok(server.clone()), session_manager, config);
            let app = axum::Router::new().nest_service("/mcp", service);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .context("Failed to bind to address")?;
            tracing::debug!("Listening on {}", addr);
            axum::serve(listener, app)
                .await
                .context("HTTP server error")?;
        }
    }

    Ok(())
}
