// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use std::{fs, io, path::PathBuf};

use async_trait::async_trait;

use crate::{auth::PersistedSession, error::Result, metadata};

use super::TokenStore;

pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new() -> Option<Self> {
        metadata::PROJECT_DIRS.as_ref().map(|dirs| Self {
            path: dirs.data_dir().join(metadata::SESSION_FILE),
        })
    }
}

#[async_trait]
impl TokenStore for File {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn load(&mut self) -> Result<Option<PersistedSession>> {
        match fs::File::open(&self.path) {
            Ok(fp) => Ok(Some(serde_json::from_reader(fp)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&mut self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let fp = fs::File::create(&self.path)?;
        serde_json::to_writer(fp, session)?;
        Ok(())
    }

    async fn forget(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use crate::auth::Token;

    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> File {
        File {
            path: dir.path().join(metadata::SESSION_FILE),
        }
    }

    #[tokio::test]
    async fn round_trips_a_session() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut store = store_in(&dir);

        assert!(store.load().await?.is_none());

        let session = PersistedSession::new(Token::new(SecretString::new("tok-1".to_owned())));
        store.save(&session).await?;
        let loaded = store.load().await?.map(PersistedSession::into_token);
        assert_eq!(loaded.as_ref().map(Token::expose), Some("tok-1"));

        store.forget().await?;
        assert!(store.load().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn forgetting_nothing_is_fine() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut store = store_in(&dir);
        store.forget().await?;
        Ok(())
    }
}
