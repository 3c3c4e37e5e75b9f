// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

//! Session state: who is signed in, and the token that proves it.
//!
//! The store is the only writer of authentication state. It owns the token
//! backend and a [`TokenCell`] shared with the HTTP transport, and it upholds
//! one invariant throughout: the authenticated state holds both a token and a
//! resolved user, or neither.

use std::{fmt, sync::Arc};

use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::RwLock;

use crate::{
    api::{self, Api, User},
    error::Result,
    storage::TokenStore,
};

/// Opaque bearer credential issued by login or registration.
#[derive(Clone)]
pub(crate) struct Token(SecretString);

impl Token {
    pub(crate) fn new(secret: SecretString) -> Self {
        Self(secret)
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(…)")
    }
}

// secrecy deliberately does not serialize secrets; persisting the token is
// the one place this client must.
impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(SecretString::new(String::deserialize(deserializer)?)))
    }
}

/// The one record that survives between invocations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct PersistedSession {
    token: Token,
}

impl PersistedSession {
    pub(crate) fn new(token: Token) -> Self {
        Self { token }
    }

    pub(crate) fn into_token(self) -> Token {
        self.token
    }
}

/// Shared slot the HTTP transport reads the bearer token from. Only the
/// [`Store`] writes it.
#[derive(Default)]
pub(crate) struct TokenCell(RwLock<Option<Token>>);

impl TokenCell {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn get(&self) -> Option<Token> {
        self.0.read().await.clone()
    }

    async fn set(&self, token: Token) {
        *self.0.write().await = Some(token);
    }

    async fn clear(&self) {
        *self.0.write().await = None;
    }
}

enum State {
    Hydrating,
    Anonymous,
    Authenticated { user: User },
}

pub(crate) struct Store<A> {
    api: A,
    storage: Box<dyn TokenStore>,
    token: Arc<TokenCell>,
    state: State,
}

impl<A: Api + Send + Sync> Store<A> {
    pub(crate) fn new(api: A, storage: Box<dyn TokenStore>, token: Arc<TokenCell>) -> Self {
        Self {
            api,
            storage,
            token,
            state: State::Hydrating,
        }
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        matches!(self.state, State::Authenticated { .. })
    }

    pub(crate) fn user(&self) -> Option<&User> {
        match self.state {
            State::Authenticated { ref user } => Some(user),
            State::Hydrating | State::Anonymous => None,
        }
    }

    /// Whether a token saved by login or registration outlives this process.
    pub(crate) fn remembers_session(&self) -> bool {
        self.storage.is_persistent()
    }

    /// Restores the saved session, if any. A token the service no longer
    /// accepts is discarded, whatever the reason; an unreachable server
    /// during hydration is a logout, not a retry.
    pub(crate) async fn hydrate(&mut self) {
        let saved = match self.storage.load().await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Ignoring an unreadable saved session: {}", e);
                None
            }
        };

        match saved {
            Some(session) => {
                self.token.set(session.into_token()).await;
                match self.api.me().await {
                    Ok(user) => {
                        debug!("Restored the session for {}", user.email);
                        self.state = State::Authenticated { user };
                    }
                    Err(e) => {
                        warn!(
                            "Discarding the saved session because the service did not accept it: {}",
                            e
                        );
                        self.reset().await;
                    }
                }
            }
            None => self.state = State::Anonymous,
        }
    }

    pub(crate) async fn login(&mut self, credentials: &api::Credentials) -> Result<()> {
        let grant = self.api.login(credentials).await?;
        self.install(grant).await
    }

    pub(crate) async fn register(&mut self, registration: &api::Registration) -> Result<()> {
        let grant = self.api.register(registration).await?;
        self.install(grant).await
    }

    /// Unconditional and infallible; storage trouble is logged, never raised.
    pub(crate) async fn logout(&mut self) {
        self.reset().await;
    }

    async fn install(&mut self, grant: api::TokenGrant) -> Result<()> {
        let token = Token::new(grant.access_token);
        self.storage.save(&PersistedSession::new(token.clone())).await?;
        self.token.set(token).await;
        match self.api.me().await {
            Ok(user) => {
                self.state = State::Authenticated { user };
                Ok(())
            }
            Err(e) => {
                // A token we cannot resolve to a user is not kept, not even
                // in memory.
                self.reset().await;
                Err(e)
            }
        }
    }

    async fn reset(&mut self) {
        if let Err(e) = self.storage.forget().await {
            warn!("Could not remove the saved session: {}", e);
        }
        self.token.clear().await;
        self.state = State::Anonymous;
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_test::{assert_ser_tokens, Token as SerdeToken};

    use crate::{
        api::{
            Credentials, FollowupAnswer, GeneratedImage, ImageRequest, InterpretRequest,
            Interpretation, Registration, Session, TokenGrant,
        },
        error::{self, Error},
        storage::Memory,
    };

    use super::*;

    struct FakeApi {
        reject_login: bool,
        reject_me: bool,
    }

    impl FakeApi {
        fn accepting() -> Self {
            Self {
                reject_login: false,
                reject_me: false,
            }
        }

        fn rejecting_me() -> Self {
            Self {
                reject_login: false,
                reject_me: true,
            }
        }

        fn rejecting_login() -> Self {
            Self {
                reject_login: true,
                reject_me: false,
            }
        }

        fn grant() -> TokenGrant {
            TokenGrant {
                access_token: SecretString::new("tok-1".to_owned()),
            }
        }

        fn rejection() -> Error {
            error::Api::Status {
                status: 401,
                message: "Unauthorized".to_owned(),
            }
            .into()
        }
    }

    #[async_trait]
    impl Api for FakeApi {
        async fn register(&self, _registration: &Registration) -> Result<TokenGrant> {
            self.login(&Credentials {
                email: "luna@example.com".to_owned(),
                password: SecretString::new("segura".to_owned()),
            })
            .await
        }

        async fn login(&self, _credentials: &Credentials) -> Result<TokenGrant> {
            if self.reject_login {
                return Err(Self::rejection());
            }
            Ok(Self::grant())
        }

        async fn me(&self) -> Result<User> {
            if self.reject_me {
                return Err(Self::rejection());
            }
            Ok(User {
                email: "luna@example.com".to_owned(),
                name: Some("Luna".to_owned()),
            })
        }

        async fn health(&self) -> Result<()> {
            Ok(())
        }

        async fn interpret(&self, _request: &InterpretRequest) -> Result<Interpretation> {
            Err(Self::rejection())
        }

        async fn sessions(&self, _limit: usize) -> Result<Vec<Session>> {
            Err(Self::rejection())
        }

        async fn session(&self, _id: &str) -> Result<Session> {
            Err(Self::rejection())
        }

        async fn followup(&self, _id: &str, _question: &str) -> Result<FollowupAnswer> {
            Err(Self::rejection())
        }

        async fn delete_session(&self, _id: &str) -> Result<()> {
            Err(Self::rejection())
        }

        async fn generate_image(&self, _request: &ImageRequest) -> Result<GeneratedImage> {
            Err(Self::rejection())
        }
    }

    fn store_with(api: FakeApi, memory: &Memory) -> Store<FakeApi> {
        Store::new(
            api,
            Box::new(memory.clone()),
            Arc::new(TokenCell::new()),
        )
    }

    fn credentials() -> Credentials {
        Credentials {
            email: "luna@example.com".to_owned(),
            password: SecretString::new("segura".to_owned()),
        }
    }

    async fn saved_token(memory: &Memory) -> Option<String> {
        memory
            .clone()
            .load()
            .await
            .unwrap()
            .map(|session| session.into_token().expose().to_owned())
    }

    #[tokio::test]
    async fn login_authenticates_and_persists_the_token() {
        let memory = Memory::new();
        let mut store = store_with(FakeApi::accepting(), &memory);
        store.hydrate().await;
        assert!(!store.is_authenticated());

        store.login(&credentials()).await.unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.user().map(|user| user.email.as_str()), Some("luna@example.com"));
        assert_eq!(saved_token(&memory).await.as_deref(), Some("tok-1"));
        assert_eq!(
            store.token.get().await.as_ref().map(Token::expose),
            Some("tok-1")
        );
    }

    #[tokio::test]
    async fn rejected_login_stays_anonymous() {
        let memory = Memory::new();
        let mut store = store_with(FakeApi::rejecting_login(), &memory);
        store.hydrate().await;

        assert!(store.login(&credentials()).await.is_err());

        assert!(!store.is_authenticated());
        assert!(saved_token(&memory).await.is_none());
        assert!(store.token.get().await.is_none());
    }

    #[tokio::test]
    async fn failed_user_fetch_after_login_keeps_no_partial_state() {
        let memory = Memory::new();
        let mut store = store_with(FakeApi::rejecting_me(), &memory);
        store.hydrate().await;

        assert!(store.login(&credentials()).await.is_err());

        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert!(saved_token(&memory).await.is_none());
        assert!(store.token.get().await.is_none());
    }

    #[tokio::test]
    async fn hydration_without_a_saved_token_is_anonymous() {
        let memory = Memory::new();
        let mut store = store_with(FakeApi::accepting(), &memory);
        store.hydrate().await;
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn hydration_restores_a_saved_session() {
        let memory = Memory::new();
        memory
            .clone()
            .save(&PersistedSession::new(Token::new(SecretString::new(
                "tok-1".to_owned(),
            ))))
            .await
            .unwrap();

        let mut store = store_with(FakeApi::accepting(), &memory);
        store.hydrate().await;

        assert!(store.is_authenticated());
        assert_eq!(saved_token(&memory).await.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn hydration_with_a_stale_token_is_a_conservative_logout() {
        let memory = Memory::new();
        memory
            .clone()
            .save(&PersistedSession::new(Token::new(SecretString::new(
                "expired".to_owned(),
            ))))
            .await
            .unwrap();

        let mut store = store_with(FakeApi::rejecting_me(), &memory);
        store.hydrate().await;

        assert!(!store.is_authenticated());
        assert!(saved_token(&memory).await.is_none());
        assert!(store.token.get().await.is_none());
    }

    #[tokio::test]
    async fn logout_always_lands_anonymous() {
        let memory = Memory::new();
        let mut store = store_with(FakeApi::accepting(), &memory);
        store.hydrate().await;
        store.login(&credentials()).await.unwrap();

        store.logout().await;

        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert!(saved_token(&memory).await.is_none());
        assert!(store.token.get().await.is_none());

        // Logging out while already anonymous is equally fine.
        store.logout().await;
        assert!(!store.is_authenticated());
    }

    #[test]
    fn persisted_session_serializes_the_bare_token() {
        let session = PersistedSession::new(Token::new(SecretString::new("tok-1".to_owned())));
        assert_ser_tokens(
            &session,
            &[
                SerdeToken::Struct {
                    name: "PersistedSession",
                    len: 1,
                },
                SerdeToken::Str("token"),
                SerdeToken::Str("tok-1"),
                SerdeToken::StructEnd,
            ],
        );
    }

    #[test]
    fn persisted_session_deserializes_from_disk_form() {
        let session: PersistedSession = serde_json::from_str(r#"{"token":"tok-1"}"#).unwrap();
        assert_eq!(session.into_token().expose(), "tok-1");
    }
}
