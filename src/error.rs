// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use std::{io, result};

use thiserror::Error;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("data conversion error: {0}")]
    Conversion(#[from] Conversion),
    #[error("validation error: {0}")]
    Validation(#[from] Validation),
    #[error("network error: {0}")]
    Network(#[from] Network),
    #[error("API error: {0}")]
    Api(#[from] Api),
    #[error("storage error: {0}")]
    Storage(#[from] Storage),
    #[error("password retrieval error: {0}")]
    Password(#[from] Password),
    #[error("operation cancelled")]
    Cancelled,
    #[error("you are not logged in (run `moonbound login` or `moonbound register` first)")]
    NotAuthenticated,
}

impl From<pinentry::Error> for Error {
    fn from(value: pinentry::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(
            clippy::wildcard_enum_match_arm,
            clippy::match_wildcard_for_single_variants
        )]
        match value {
            pinentry::Error::Cancelled | pinentry::Error::Timeout => Self::Cancelled,
            pinentry::Error::Io(e) => Self::Io(e),
            _ => Self::Password(Password::Pinentry(value)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        let host = value
            .url()
            .and_then(url::Url::host_str)
            .unwrap_or("the interpretation service")
            .to_owned();
        if value.is_timeout() {
            Self::Network(Network::Timeout { host, source: value })
        } else if value.is_connect() || value.is_request() {
            Self::Network(Network::Unreachable { host, source: value })
        } else {
            Self::Network(Network::Transport(value))
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Io(value.into())
    }
}

#[derive(Error, Debug)]
pub(crate) enum Conversion {
    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Error, Debug)]
pub(crate) enum Validation {
    #[error("an email address and a password are required")]
    MissingCredentials,
    #[error("the password must be at least {MIN_PASSWORD_LEN} characters long")]
    PasswordTooShort,
    #[error("the dream description must not be empty")]
    EmptyDreamText,
    #[error("the follow-up question must not be empty")]
    EmptyQuestion,
    #[error("a session identifier is required")]
    MissingSessionId,
    #[error("the dream description to illustrate must not be empty")]
    EmptyImageDescription,
}

#[derive(Error, Debug)]
pub(crate) enum Network {
    #[error("{host} did not answer within the request timeout (the service may be starting up; try again): {source}")]
    Timeout { host: String, source: reqwest::Error },
    #[error("{host} cannot be reached (check the service URL and your connection): {source}")]
    Unreachable { host: String, source: reqwest::Error },
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
}

#[derive(Error, Debug)]
pub(crate) enum Api {
    #[error("server rejected the request: {message}")]
    Status { status: u16, message: String },
    #[error("server sent a body we did not expect: {0}")]
    UnexpectedBody(serde_json::Error),
}

#[derive(Error, Debug)]
pub(crate) enum Storage {
    #[cfg(feature = "keychain")]
    #[error("no suitable project data directory is available on this system")]
    NoProjectDirs,
    #[cfg(feature = "secret-service")]
    #[error("secret service error: {0}")]
    SecretService(#[from] oo7::Error),
    #[cfg(feature = "keychain")]
    #[error("Keychain error: {0}")]
    Keychain(#[from] security_framework::base::Error),
}

#[derive(Error, Debug)]
pub(crate) enum Password {
    #[error("no password prompt available")]
    NoPrompt,
    #[error("Pinentry implementation error: {0}")]
    Pinentry(pinentry::Error),
}
