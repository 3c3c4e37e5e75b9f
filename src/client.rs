// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport for the interpretation service.
//!
//! One `send` carries every operation: it builds the target URL from the
//! configured base, attaches the bearer token when one is held, and
//! normalizes transport, status, and body-parsing failures into the crate
//! error taxonomy so that callers only ever see one message string.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Method};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::{
    api::{
        self, Api, Credentials, FollowupAnswer, GeneratedImage, ImageRequest, InterpretRequest,
        Interpretation, Registration, Session, TokenGrant, User,
    },
    auth::TokenCell,
    error::{self, Result},
};

#[derive(Clone)]
pub(crate) struct Http {
    http: reqwest::Client,
    base: Url,
    token: Arc<TokenCell>,
}

impl Http {
    pub(crate) fn new(base: Url, token: Arc<TokenCell>, timeout: Duration) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base,
            token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        debug!("API request: {} {}", method, url.path());

        let mut request = self.http.request(method, url);
        match self.token.get().await {
            Some(token) => request = request.bearer_auth(token.expose()),
            None => debug!("No bearer token held; sending anonymously"),
        }
        if let Some(ref fields) = body {
            request = request.json(fields);
        }

        let response = request.send().await?;
        let status = response.status();
        let declares_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.contains("application/json"));
        let text = response.text().await.unwrap_or_default();
        debug!("API response: {}", status);

        let payload = parse_payload(declares_json, &text);
        if status.is_success() {
            Ok(payload)
        } else {
            Err(error::Api::Status {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &payload),
            }
            .into())
        }
    }
}

/// JSON when the server declares JSON, plain text otherwise; a body that
/// fails to parse is an empty one.
fn parse_payload(declares_json: bool, text: &str) -> serde_json::Value {
    if declares_json {
        serde_json::from_str(text).unwrap_or(serde_json::Value::Null)
    } else if text.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::Value::String(text.to_owned())
    }
}

/// Message for a failed request, in priority order: a non-empty plain-text
/// body, a `message` field, a `detail` field, else the bare status.
fn error_message(status: u16, payload: &serde_json::Value) -> String {
    // LINT: Anything that is neither a text body nor a record falls back to
    // the synthesized status line.
    #[allow(clippy::wildcard_enum_match_arm)]
    match payload {
        serde_json::Value::String(text) if !text.is_empty() => text.clone(),
        serde_json::Value::Object(fields) => fields
            .get("message")
            .or_else(|| fields.get("detail"))
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| format!("HTTP {status}"), str::to_owned),
        _ => format!("HTTP {status}"),
    }
}

fn decode<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| error::Api::UnexpectedBody(e).into())
}

#[async_trait]
impl Api for Http {
    async fn register(&self, registration: &Registration) -> Result<TokenGrant> {
        registration.validate()?;
        let body = json!({
            "email": registration.credentials.email,
            "password": registration.credentials.password.expose_secret(),
            "nombre": registration.name,
        });
        decode(
            self.send(Method::POST, self.endpoint(&["register"])?, Some(body))
                .await?,
        )
    }

    async fn login(&self, credentials: &Credentials) -> Result<TokenGrant> {
        credentials.validate()?;
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        decode(
            self.send(Method::POST, self.endpoint(&["login"])?, Some(body))
                .await?,
        )
    }

    async fn me(&self) -> Result<User> {
        decode(self.send(Method::GET, self.endpoint(&["me"])?, None).await?)
    }

    async fn health(&self) -> Result<()> {
        // Only the 2xx matters; the body is advisory at best.
        let _ = self
            .send(Method::GET, self.endpoint(&["health"])?, None)
            .await?;
        Ok(())
    }

    async fn interpret(&self, request: &InterpretRequest) -> Result<Interpretation> {
        request.validate()?;
        decode(
            self.send(
                Method::POST,
                self.endpoint(&["interpret-text"])?,
                Some(serde_json::to_value(request)?),
            )
            .await?,
        )
    }

    async fn sessions(&self, limit: usize) -> Result<Vec<Session>> {
        let mut url = self.endpoint(&["sessions"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        api::normalize_sessions(self.send(Method::GET, url, None).await?)
    }

    async fn session(&self, id: &str) -> Result<Session> {
        api::validate_session_id(id)?;
        decode(
            self.send(Method::GET, self.endpoint(&["sessions", id])?, None)
                .await?,
        )
    }

    async fn followup(&self, id: &str, question: &str) -> Result<FollowupAnswer> {
        api::validate_session_id(id)?;
        api::validate_question(question)?;
        decode(
            self.send(
                Method::POST,
                self.endpoint(&["sessions", id, "followup"])?,
                Some(json!({ "pregunta": question })),
            )
            .await?,
        )
    }

    async fn delete_session(&self, id: &str) -> Result<()> {
        api::validate_session_id(id)?;
        let _ = self
            .send(Method::DELETE, self.endpoint(&["sessions", id])?, None)
            .await?;
        Ok(())
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        request.validate()?;
        decode(
            self.send(
                Method::POST,
                self.endpoint(&["generate-image"])?,
                Some(serde_json::to_value(request)?),
            )
            .await?,
        )
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use crate::error::{Error, Validation};

    use super::*;

    fn unreachable_client() -> Http {
        // Nothing listens here; if validation ever let a request through,
        // these tests would fail with a network error instead.
        Http::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            Arc::new(TokenCell::new()),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn endpoints_extend_the_base_path() -> crate::error::Result<()> {
        let client = unreachable_client();
        assert_eq!(
            client.endpoint(&["sessions"])?.as_str(),
            "http://127.0.0.1:9/sessions"
        );
        Ok(())
    }

    #[test]
    fn endpoints_respect_a_base_with_a_path() -> crate::error::Result<()> {
        let client = Http::new(
            Url::parse("http://127.0.0.1:9/api/v1/").unwrap(),
            Arc::new(TokenCell::new()),
            Duration::from_secs(1),
        )?;
        assert_eq!(
            client.endpoint(&["sessions", "s-1"])?.as_str(),
            "http://127.0.0.1:9/api/v1/sessions/s-1"
        );
        Ok(())
    }

    #[test]
    fn endpoints_encode_identifier_segments() -> crate::error::Result<()> {
        let client = unreachable_client();
        let url = client.endpoint(&["sessions", "id with/slash"])?;
        assert_eq!(url.path(), "/sessions/id%20with%2Fslash");
        Ok(())
    }

    #[tokio::test]
    async fn empty_credentials_fail_before_any_request() {
        let client = unreachable_client();
        let credentials = Credentials {
            email: String::new(),
            password: SecretString::new("segura".to_owned()),
        };
        assert!(matches!(
            client.login(&credentials).await,
            Err(Error::Validation(Validation::MissingCredentials))
        ));
    }

    #[tokio::test]
    async fn short_passwords_fail_registration_before_any_request() {
        let client = unreachable_client();
        let registration = Registration {
            credentials: Credentials {
                email: "luna@example.com".to_owned(),
                password: SecretString::new("corta".to_owned()),
            },
            name: String::new(),
        };
        assert!(matches!(
            client.register(&registration).await,
            Err(Error::Validation(Validation::PasswordTooShort))
        ));
    }

    #[tokio::test]
    async fn blank_dream_text_fails_before_any_request() {
        let client = unreachable_client();
        let request = InterpretRequest::new("   ".to_owned(), String::new(), false, String::new());
        assert!(matches!(
            client.interpret(&request).await,
            Err(Error::Validation(Validation::EmptyDreamText))
        ));
    }

    #[tokio::test]
    async fn followups_validate_both_arguments_before_any_request() {
        let client = unreachable_client();
        assert!(matches!(
            client.followup("", "¿qué significa volar?").await,
            Err(Error::Validation(Validation::MissingSessionId))
        ));
        assert!(matches!(
            client.followup("s-1", " ").await,
            Err(Error::Validation(Validation::EmptyQuestion))
        ));
    }

    #[test]
    fn payloads_follow_the_content_type() {
        assert_eq!(
            parse_payload(true, r#"{"ok":true}"#),
            serde_json::json!({"ok": true})
        );
        assert_eq!(
            parse_payload(false, "service online"),
            serde_json::Value::String("service online".to_owned())
        );
    }

    #[test]
    fn unparseable_payloads_become_empty_ones() {
        assert_eq!(parse_payload(true, "<html>oops</html>"), serde_json::Value::Null);
        assert_eq!(parse_payload(false, ""), serde_json::Value::Null);
    }

    #[test]
    fn error_messages_follow_the_priority_order() {
        assert_eq!(
            error_message(500, &serde_json::Value::String("se cayó todo".to_owned())),
            "se cayó todo"
        );
        assert_eq!(
            error_message(401, &serde_json::json!({"message": "bad token", "detail": "ignored"})),
            "bad token"
        );
        assert_eq!(
            error_message(404, &serde_json::json!({"detail": "no such session"})),
            "no such session"
        );
        assert_eq!(
            error_message(502, &serde_json::json!({"unrelated": true})),
            "HTTP 502"
        );
        assert_eq!(error_message(500, &serde_json::Value::Null), "HTTP 500");
    }
}
