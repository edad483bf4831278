//! Shared MCP test helpers for driving the stdio server subprocess.

#![cfg(feature = "mcp")]
#![allow(dead_code)]

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStderr, ChildStdin, ChildStdout};
use tokio::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn find_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_skyhop-mcp"))
}

pub async fn send(stdin: &mut ChildStdin, message: Value) -> Result<()> {
    let mut line = message.to_string();
    line.push('\n');
    stdin.write_all(line.as_bytes()).await?;
    stdin.flush().await?;
    Ok(())
}

/// Read stdout lines until the JSON-RPC response with `id` shows up.
pub async fn read_response(stdout: &mut BufReader<ChildStdout>, id: u64) -> Result<String> {
    let marker = format!("\"id\":{}", id);
    loop {
        let mut line = String::new();
        let n = tokio::time::timeout(TIMEOUT, stdout.read_line(&mut line))
            .await
            .context("Timed out waiting for MCP response")??;
        anyhow::ensure!(n > 0, "MCP server closed stdout before answering id {}", id);
        if line.contains(&marker) {
            return Ok(line);
        }
    }
}

pub async fn mcp_initialize(
    stdin: &mut ChildStdin,
    stdout: &mut BufReader<ChildStdout>,
) -> Result<()> {
    send(
        stdin,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0"}
            }
        }),
    )
    .await?;

    let resp = read_response(stdout, 1).await?;
    anyhow::ensure!(resp.contains("2.0"), "Should get JSON-RPC init response: {}", resp);

    send(
        stdin,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
    )
    .await
}

pub async fn stream_stderr_to_console(mut stderr: ChildStderr) {
    let mut buf = [0u8; 4096];
    while let Ok(n) = stderr.read(&mut buf).await {
        if n == 0 {
            break;
        }
        eprint!("{}", String::from_utf8_lossy(&buf[..n]));
    }
}
