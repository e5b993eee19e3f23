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

//! Session token storage
//!
//! The token returned by `/auth/login` is the only session state. It lives
//! under a fixed key so every part of the core sees the same session.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ApiError;

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "TOKEN_APP";

/// Where the bearer token is kept between requests and restarts
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, ApiError>;
    async fn save(&self, token: &str) -> Result<(), ApiError>;
    async fn clear(&self) -> Result<(), ApiError>;

    /// A stored token that is not blank
    async fn current(&self) -> Result<Option<String>, ApiError> {
        Ok(self
            .load()
            .await?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }
}

/// Process-local token store, used when the cache database cannot be opened
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, ApiError> {
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &str) -> Result<(), ApiError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApiError> {
        *self.token.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn blank_token_is_no_session() {
        let store = MemoryTokenStore::with_token("   ");
        assert_eq!(block_on(store.current()).unwrap(), None);

        block_on(store.save(" abc ")).unwrap();
        assert_eq!(block_on(store.current()).unwrap().as_deref(), Some("abc"));

        block_on(store.clear()).unwrap();
        assert_eq!(block_on(store.load()).unwrap(), None);
    }

    #[test]
    fn new_store_is_empty() {
        assert_eq!(block_on(MemoryTokenStore::new().current()).unwrap(), None);
    }
}
