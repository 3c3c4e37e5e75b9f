// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use secrecy::{ExposeSecret as _, SecretVec};
use security_framework::os::macos::keychain::{SecKeychain, SecPreferencesDomain};

use crate::{
    auth::PersistedSession,
    error::{self, Result},
    metadata,
};

use super::TokenStore;

pub(crate) struct Keychain {
    delegate: SecKeychain,
    service: String,
    account: String,
}

// errSecItemNotFound
const NOT_FOUND: i32 = -25300_i32;

impl Keychain {
    pub(crate) fn new(api_url: &url::Url) -> Result<Self> {
        Ok(Self {
            delegate: SecKeychain::default_for_domain(SecPreferencesDomain::User)
                .map_err(Into::<error::Storage>::into)?,
            service: metadata::PROJECT_DIRS
                .as_ref()
                .map(|dirs| dirs.project_path().as_os_str())
                .ok_or(error::Storage::NoProjectDirs)?
                .to_string_lossy()
                .to_string(),
            account: api_url.to_string(),
        })
    }
}

#[async_trait]
impl TokenStore for Keychain {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn load(&mut self) -> Result<Option<PersistedSession>> {
        let result = self
            .delegate
            .find_generic_password(&self.service, &self.account);
        match result {
            Ok((password, _)) => Ok(Some(serde_json::from_slice(&password)?)),
            Err(err) if err.code() == NOT_FOUND => Ok(None),
            Err(err) => Err(Into::<error::Storage>::into(err).into()),
        }
    }

    async fn save(&mut self, session: &PersistedSession) -> Result<()> {
        self.delegate
            .set_generic_password(
                &self.service,
                &self.account,
                SecretVec::new(serde_json::to_vec(session)?).expose_secret(),
            )
            .map_err(Into::<error::Storage>::into)?;
        Ok(())
    }

    async fn forget(&mut self) -> Result<()> {
        let result = self
            .delegate
            .find_generic_password(&self.service, &self.account);
        match result {
            Ok((_, item)) => item.delete(),
            Err(err) if err.code() == NOT_FOUND => {}
            Err(err) => return Err(Into::<error::Storage>::into(err).into()),
        };
        Ok(())
    }
}
