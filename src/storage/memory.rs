// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{auth::PersistedSession, error::Result};

use super::TokenStore;

/// Fallback backend when no durable storage is available. Clones share the
/// same slot, which is also what lets tests observe a store from outside.
#[derive(Clone, Default)]
pub(crate) struct Memory {
    data: Arc<RwLock<Option<PersistedSession>>>,
}

impl Memory {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for Memory {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn load(&mut self) -> Result<Option<PersistedSession>> {
        let guard = self.data.read().await;
        Ok(guard.clone())
    }

    async fn save(&mut self, session: &PersistedSession) -> Result<()> {
        let mut guard = self.data.write().await;
        *guard = Some(session.clone());
        Ok(())
    }

    async fn forget(&mut self) -> Result<()> {
        let mut guard = self.data.write().await;
        *guard = None;
        Ok(())
    }
}
