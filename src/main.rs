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

//! Shelter Admin Core
//!
//! Background process behind the shelter admin UI. It owns the API session,
//! the table state of each screen and the local cache, and talks to the UI
//! over a Unix socket or named pipe using line-delimited JSON.

mod api;
mod bulk;
mod cache;
mod config;
mod error;
mod export;
mod ipc;
mod logger;
mod models;
mod session;
mod views;
mod workflow;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::{Context, Result};
use logger::Logger;
use tracing::{error, info, warn};

use crate::api::ShelterClient;
use crate::cache::CacheManager;
use crate::config::AppConfig;
use crate::ipc::MessageHandler;
use crate::session::{MemoryTokenStore, TokenStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    Logger::init()?;

    info!("Shelter Admin Core starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("API: {}", config.api_base_url);

    let cache = match CacheManager::new().await {
        Ok(cache) => {
            if let Err(e) = cache.cleanup(config.cache_max_age_days).await {
                warn!("Cache cleanup failed: {}", e);
            }
            Some(Arc::new(cache))
        }
        Err(e) => {
            warn!("Cache unavailable, session will not survive a restart: {}", e);
            None
        }
    };

    let tokens: Arc<dyn TokenStore> = match &cache {
        Some(cache) => cache.clone(),
        None => Arc::new(MemoryTokenStore::new()),
    };

    let client = ShelterClient::new(&config.api_base_url, config.request_timeout(), tokens)
        .context("Failed to build HTTP client")?;

    let handler = Arc::new(MessageHandler::new(
        Arc::new(client),
        cache,
        config.bulk_concurrency,
    ));

    match ipc::server::run_server(handler, &config.ipc_endpoint).await {
        Ok(_) => {
            info!("Shelter Admin Core shutting down gracefully");
        }
        Err(e) => {
            error!("Fatal error in IPC server: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
