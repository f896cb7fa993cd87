//! Per-credential document API client cache.
//!
//! Clients are scoped to a cache instance injected by the caller, not held in
//! module-level state, so tests can observe and reset them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ps_core::{PsError, PsResult};

use crate::config::StoreConfig;
use crate::notion::NotionApi;
use crate::store::PromptStore;

pub struct ClientCache {
    config: StoreConfig,
    clients: Mutex<HashMap<String, Arc<NotionApi>>>,
}

impl ClientCache {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Get or build the API client for a bearer token. An absent token means
    /// the user never connected the integration.
    pub fn client_for(&self, token: &str) -> PsResult<Arc<NotionApi>> {
        if token.trim().is_empty() {
            return Err(PsError::NotConnected(
                "no document API credential for this user".into(),
            ));
        }

        let mut clients = self.clients.lock().unwrap();
        if let Some(client) = clients.get(token) {
            return Ok(client.clone());
        }

        let client = Arc::new(NotionApi::new(token, &self.config.notion)?);
        clients.insert(token.to_string(), client.clone());
        Ok(client)
    }

    /// Convenience: a ready content store bound to the token's client.
    pub fn store_for(&self, token: &str) -> PsResult<PromptStore> {
        let client = self.client_for(token)?;
        Ok(PromptStore::new(client, self.config.max_chunk_size))
    }

    pub fn len(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.clients.lock().unwrap().clear();
    }
}
