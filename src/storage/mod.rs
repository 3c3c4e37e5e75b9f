// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

mod file;
#[cfg(feature = "keychain")]
mod keychain;
mod memory;
#[cfg(feature = "secret-service")]
mod secret_service;

use async_trait::async_trait;

use crate::{auth::PersistedSession, error::Result};

pub(crate) use file::File;
#[cfg(feature = "keychain")]
pub(crate) use keychain::Keychain;
pub(crate) use memory::Memory;
#[cfg(feature = "secret-service")]
pub(crate) use secret_service::SecretService;

/// Where the session token lives between invocations. Exactly one record is
/// ever stored, under a fixed name per backend.
#[async_trait]
pub(crate) trait TokenStore: Send + Sync {
    /// Whether a saved token outlives this process.
    fn is_persistent(&self) -> bool;

    async fn load(&mut self) -> Result<Option<PersistedSession>>;
    async fn save(&mut self, session: &PersistedSession) -> Result<()>;

    /// Removing a token that is not stored is not an error; `logout` must
    /// never fail.
    async fn forget(&mut self) -> Result<()>;
}
