// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretVec};

use crate::{
    auth::PersistedSession,
    error::{self, Result},
    metadata,
};

use super::TokenStore;

pub(crate) struct SecretService {
    keyring: oo7::Keyring,
    attributes: HashMap<String, String>,
}

impl SecretService {
    async fn item(&self) -> Result<Option<oo7::Item>> {
        Ok(self
            .keyring
            .search_items(
                self.attributes
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str()))
                    .collect(),
            )
            .await
            .map_err(error::Storage::from)?
            .into_iter()
            .next())
    }

    pub(crate) async fn new(api_url: &url::Url) -> Result<Self> {
        Ok(Self {
            keyring: oo7::Keyring::new().await.map_err(error::Storage::from)?,
            attributes: HashMap::from([
                ("moonbound.kind".to_owned(), "session".to_owned()),
                ("moonbound.api".to_owned(), api_url.as_str().to_owned()),
            ]),
        })
    }
}

#[async_trait]
impl TokenStore for SecretService {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn load(&mut self) -> Result<Option<PersistedSession>> {
        let session = match self.item().await? {
            Some(item) => {
                let secret = item.secret().await.map_err(error::Storage::from)?;
                serde_json::from_slice(&secret)?
            }
            None => None,
        };
        Ok(session)
    }

    async fn save(&mut self, session: &PersistedSession) -> Result<()> {
        self.keyring
            .create_item(
                &metadata::CLIENT_DISPLAY_NAME,
                self.attributes
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str()))
                    .collect(),
                SecretVec::new(serde_json::to_vec(session)?).expose_secret(),
                true,
            )
            .await
            .map_err(error::Storage::from)?;
        Ok(())
    }

    async fn forget(&mut self) -> Result<()> {
        if let Some(item) = self.item().await? {
            item.delete().await.map_err(error::Storage::from)?;
        }
        Ok(())
    }
}
