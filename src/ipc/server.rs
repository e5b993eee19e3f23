// Shelter Admin - Administrative core for an animal-shelter platform
// Copyright (C) 2025 Shelter Admin Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! IPC server over a Unix socket or a Windows named pipe

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::models::{error_codes, IpcError, IpcMessage};

use super::handler::MessageHandler;

/// Run the IPC server until a `shutdown` request arrives
pub async fn run_server(handler: Arc<MessageHandler>, endpoint: &str) -> Result<()> {
    info!("Starting IPC server on {}", endpoint);

    #[cfg(windows)]
    {
        run_windows_pipe_server(handler, endpoint).await
    }

    #[cfg(not(windows))]
    {
        run_unix_socket_server(handler, endpoint).await
    }
}

#[cfg(windows)]
async fn run_windows_pipe_server(handler: Arc<MessageHandler>, endpoint: &str) -> Result<()> {
    use tokio::net::windows::named_pipe::ServerOptions;

    let mut shutdown = handler.shutdown_signal();
    let mut first = true;

    loop {
        let pipe = ServerOptions::new()
            .first_pipe_instance(first)
            .create(endpoint)
            .context("Failed to create named pipe")?;
        first = false;

        info!("Waiting for client connection...");

        tokio::select! {
            result = pipe.connect() => {
                match result {
                    Ok(()) => {
                        info!("Client connected");
                        spawn_client(pipe, handler.clone());
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = shutdown.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(not(windows))]
async fn run_unix_socket_server(handler: Arc<MessageHandler>, endpoint: &str) -> Result<()> {
    use tokio::net::UnixListener;

    // a stale socket from a previous run blocks bind
    let _ = std::fs::remove_file(endpoint);

    let listener = UnixListener::bind(endpoint)
        .with_context(|| format!("Failed to bind Unix socket {}", endpoint))?;
    let mut shutdown = handler.shutdown_signal();

    info!("Listening on {}", endpoint);

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        info!("Client connected");
                        spawn_client(stream, handler.clone());
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = shutdown.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    let _ = std::fs::remove_file(endpoint);

    Ok(())
}

fn spawn_client<S>(stream: S, handler: Arc<MessageHandler>)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = handle_client(stream, handler).await {
            error!("Client handler error: {}", e);
        }
    });
}

async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, msg: &IpcMessage) -> Result<()> {
    let json = serde_json::to_string(msg)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    debug!("Sent message: {}", json);
    Ok(())
}

/// Serve one client. Each request runs in its own task so a newer list
/// refresh can supersede one still in flight; events are interleaved with
/// responses on the same stream.
async fn handle_client<S>(stream: S, handler: Arc<MessageHandler>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();
    let mut events = handler.subscribe_events();
    let (responses_tx, mut responses) = mpsc::channel::<IpcMessage>(32);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("Client disconnected");
                        break;
                    }
                    Err(e) => {
                        error!("Read error: {}", e);
                        break;
                    }
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                debug!("Received message: {}", trimmed);

                match serde_json::from_str::<IpcMessage>(trimmed) {
                    Ok(msg) => {
                        let handler = handler.clone();
                        let tx = responses_tx.clone();
                        tokio::spawn(async move {
                            let response = handler.handle_message(msg).await;
                            let _ = tx.send(response).await;
                        });
                    }
                    Err(e) => {
                        warn!("Failed to parse message: {}", e);
                        let error_response = IpcMessage::response_err(
                            "unknown",
                            IpcError::new(
                                error_codes::PARSE_ERROR,
                                format!("Failed to parse message: {}", e),
                            ),
                        );
                        write_message(&mut writer, &error_response).await?;
                    }
                }
            }
            Some(response) = responses.recv() => {
                write_message(&mut writer, &response).await?;
            }
            event = events.recv() => {
                match event {
                    Ok(event) => write_message(&mut writer, &event).await?,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Client lagged, {} events dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}
