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

use std::time::Duration;

use anyhow::{bail, Context, Result};

#[cfg(unix)]
const DEFAULT_IPC_ENDPOINT: &str = "/tmp/shelter_admin_ipc.sock";
#[cfg(windows)]
const DEFAULT_IPC_ENDPOINT: &str = r"\\.\pipe\shelter_admin_ipc";

/// Core configuration loaded from environment variables.
///
/// | Env Var                        | Default                       |
/// |--------------------------------|-------------------------------|
/// | `SHELTER_API_URL`              | required                      |
/// | `SHELTER_REQUEST_TIMEOUT_SECS` | `30`                          |
/// | `SHELTER_BULK_CONCURRENCY`     | `4`                           |
/// | `SHELTER_CACHE_MAX_AGE_DAYS`   | `7`                           |
/// | `SHELTER_IPC_ENDPOINT`         | platform socket / named pipe  |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub bulk_concurrency: usize,
    pub cache_max_age_days: u32,
    pub ipc_endpoint: String,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_base_url = lookup("SHELTER_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .context("SHELTER_API_URL must be set")?;

        let bulk_concurrency: usize = parse_or(&lookup, "SHELTER_BULK_CONCURRENCY", 4)?;
        if bulk_concurrency == 0 {
            bail!("SHELTER_BULK_CONCURRENCY must be at least 1");
        }

        Ok(Self {
            api_base_url: normalize_url(&api_base_url),
            request_timeout_secs: parse_or(&lookup, "SHELTER_REQUEST_TIMEOUT_SECS", 30)?,
            bulk_concurrency,
            cache_max_age_days: parse_or(&lookup, "SHELTER_CACHE_MAX_AGE_DAYS", 7)?,
            ipc_endpoint: lookup("SHELTER_IPC_ENDPOINT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IPC_ENDPOINT.to_string()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number, got {raw:?}")),
        _ => Ok(default),
    }
}

/// Add a scheme when missing and drop the trailing slash
fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    url.trim_end_matches('/').to_string()
}
