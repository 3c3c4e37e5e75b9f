// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

//! The typed surface of the interpretation service.
//!
//! Wire field names follow the service contract (Spanish); deserialization
//! additionally tolerates the English aliases older deployments of the
//! service have been observed to emit.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{self, Result};

pub(crate) const DEFAULT_IMAGE_STYLE: &str = "arte digital vibrante";

#[derive(Debug, Deserialize)]
pub(crate) struct TokenGrant {
    pub(crate) access_token: SecretString,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct User {
    pub(crate) email: String,
    #[serde(default, rename = "nombre", alias = "name")]
    pub(crate) name: Option<String>,
}

impl User {
    pub(crate) fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug)]
pub(crate) struct Credentials {
    pub(crate) email: String,
    pub(crate) password: SecretString,
}

impl Credentials {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.expose_secret().is_empty() {
            return Err(error::Validation::MissingCredentials.into());
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct Registration {
    pub(crate) credentials: Credentials,
    /// Optional display name; the service accepts an empty string.
    pub(crate) name: String,
}

impl Registration {
    pub(crate) fn validate(&self) -> Result<()> {
        self.credentials.validate()?;
        if self.credentials.password.expose_secret().chars().count() < error::MIN_PASSWORD_LEN {
            return Err(error::Validation::PasswordTooShort.into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InterpretRequest {
    #[serde(rename = "texto_sueno")]
    pub(crate) dream_text: String,
    #[serde(rename = "contexto_emocional")]
    pub(crate) emotional_context: String,
    pub(crate) save: bool,
    pub(crate) filename: String,
    // Always false; carried because the service contract includes it.
    offline: bool,
}

impl InterpretRequest {
    pub(crate) fn new(
        dream_text: String,
        emotional_context: String,
        save: bool,
        filename: String,
    ) -> Self {
        Self {
            dream_text,
            emotional_context,
            save,
            filename,
            offline: false,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.dream_text.trim().is_empty() {
            return Err(error::Validation::EmptyDreamText.into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageRequest {
    #[serde(rename = "descripcion_sueno")]
    pub(crate) description: String,
    #[serde(rename = "estilo")]
    pub(crate) style: String,
}

impl ImageRequest {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(error::Validation::EmptyImageDescription.into());
        }
        Ok(())
    }
}

pub(crate) fn validate_session_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(error::Validation::MissingSessionId.into());
    }
    Ok(())
}

pub(crate) fn validate_question(question: &str) -> Result<()> {
    if question.trim().is_empty() {
        return Err(error::Validation::EmptyQuestion.into());
    }
    Ok(())
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct Interpretation {
    #[serde(default, rename = "sesion_id", alias = "session_id", alias = "id")]
    pub(crate) session_id: Option<String>,
    #[serde(default, rename = "interpretacion", alias = "interpretation")]
    pub(crate) interpretation: String,
    #[serde(default, alias = "imagen_url")]
    pub(crate) image_url: Option<String>,
    #[serde(default, rename = "descripcion")]
    pub(crate) image_description: Option<String>,
    #[serde(default, alias = "saved_path", alias = "filename")]
    pub(crate) saved_file: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct Session {
    #[serde(default, alias = "_id", alias = "sesion_id", alias = "session_id")]
    pub(crate) id: String,
    #[serde(default, alias = "titulo")]
    pub(crate) title: Option<String>,
    #[serde(default, rename = "texto_sueno")]
    pub(crate) dream_text: String,
    #[serde(default, rename = "contexto_emocional")]
    pub(crate) emotional_context: Option<String>,
    #[serde(default, rename = "interpretacion")]
    pub(crate) interpretation: Option<String>,
    #[serde(default, rename = "interpretacion_resumen", alias = "resumen")]
    pub(crate) summary: Option<String>,
    #[serde(default, alias = "imagen_url")]
    pub(crate) image_url: Option<String>,
    #[serde(default, rename = "descripcion")]
    pub(crate) image_description: Option<String>,
    #[serde(default, alias = "follow_ups")]
    pub(crate) followups: Vec<FollowupEntry>,
    #[serde(default, alias = "fecha", alias = "timestamp", alias = "date")]
    pub(crate) created_at: Option<String>,
}

impl Session {
    /// Best-effort one-line summary for list display.
    pub(crate) fn summary_text(&self) -> &str {
        self.summary
            .as_deref()
            .filter(|summary| !summary.is_empty())
            .unwrap_or(&self.dream_text)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct FollowupEntry {
    #[serde(default, rename = "pregunta", alias = "question")]
    pub(crate) question: String,
    #[serde(default, rename = "respuesta", alias = "answer", alias = "response")]
    pub(crate) answer: String,
    #[serde(default)]
    pub(crate) timestamp: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct FollowupAnswer {
    #[serde(default, rename = "respuesta", alias = "answer", alias = "response")]
    pub(crate) answer: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct GeneratedImage {
    #[serde(default, rename = "imagen_url", alias = "image_url")]
    pub(crate) image: Option<String>,
    #[serde(default, rename = "descripcion")]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) prompt: Option<String>,
}

/// The operations the interpretation service offers. Commands and the auth
/// store depend on this trait rather than on the HTTP transport so that they
/// can be exercised against a test double.
#[async_trait]
pub(crate) trait Api {
    async fn register(&self, registration: &Registration) -> Result<TokenGrant>;
    async fn login(&self, credentials: &Credentials) -> Result<TokenGrant>;
    async fn me(&self) -> Result<User>;
    async fn health(&self) -> Result<()>;
    async fn interpret(&self, request: &InterpretRequest) -> Result<Interpretation>;
    async fn sessions(&self, limit: usize) -> Result<Vec<Session>>;
    async fn session(&self, id: &str) -> Result<Session>;
    async fn followup(&self, id: &str, question: &str) -> Result<FollowupAnswer>;
    async fn delete_session(&self, id: &str) -> Result<()>;
    async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage>;
}

/// Maps every session-list shape the service has been observed to send onto
/// one canonical sequence: a bare array, an object with a `sessions` array,
/// or a map from identifier to record (the identifier is synthesized onto
/// records that lack one). Anything else normalizes to an empty list.
pub(crate) fn normalize_sessions(payload: serde_json::Value) -> Result<Vec<Session>> {
    match payload {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Into::into))
            .collect(),
        serde_json::Value::Object(mut map) => {
            if map.get("sessions").map_or(false, serde_json::Value::is_array) {
                return match map.remove("sessions") {
                    Some(sessions) => normalize_sessions(sessions),
                    None => Ok(Vec::new()),
                };
            }
            map.into_iter()
                .filter(|(_, value)| value.is_object())
                .map(|(key, value)| {
                    let mut session: Session = serde_json::from_value(value)?;
                    if session.id.is_empty() {
                        session.id = key;
                    }
                    Ok(session)
                })
                .collect()
        }
        // LINT: Everything else (null, bare scalars) is an empty list, per
        // the tolerance contract.
        #[allow(clippy::wildcard_enum_match_arm)]
        _ => Ok(Vec::new()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ImagePayload {
    /// Decoded bytes of an inline image (a `data:` URL or raw base64).
    Inline(Vec<u8>),
    /// An `http(s)` location the service expects the client to fetch itself.
    Remote(String),
}

pub(crate) fn image_payload(raw: &str) -> Result<ImagePayload> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Ok(ImagePayload::Remote(raw.to_owned()));
    }
    let encoded = match raw.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => raw,
    };
    Ok(ImagePayload::Inline(
        base64::decode(encoded.trim()).map_err(error::Conversion::from)?,
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::{Error, Validation};

    use super::*;

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_owned(),
            password: SecretString::new(password.to_owned()),
        }
    }

    #[test]
    fn credentials_require_email_and_password() {
        assert!(matches!(
            credentials("", "hunter2").validate(),
            Err(Error::Validation(Validation::MissingCredentials))
        ));
        assert!(matches!(
            credentials("luna@example.com", "").validate(),
            Err(Error::Validation(Validation::MissingCredentials))
        ));
        assert!(credentials("luna@example.com", "hunter2").validate().is_ok());
    }

    #[test]
    fn registration_enforces_password_length() {
        let registration = Registration {
            credentials: credentials("luna@example.com", "corta"),
            name: String::new(),
        };
        assert!(matches!(
            registration.validate(),
            Err(Error::Validation(Validation::PasswordTooShort))
        ));

        let valid = Registration {
            credentials: credentials("luna@example.com", "segura"),
            name: "Luna".to_owned(),
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn interpret_request_rejects_blank_text() {
        let request = InterpretRequest::new("  \n".to_owned(), String::new(), false, String::new());
        assert!(matches!(
            request.validate(),
            Err(Error::Validation(Validation::EmptyDreamText))
        ));
    }

    #[test]
    fn session_references_are_validated() {
        assert!(matches!(
            validate_session_id(" "),
            Err(Error::Validation(Validation::MissingSessionId))
        ));
        assert!(validate_session_id("abc-123").is_ok());
        assert!(matches!(
            validate_question(""),
            Err(Error::Validation(Validation::EmptyQuestion))
        ));
        assert!(validate_question("¿qué significa volar?").is_ok());
    }

    #[test]
    fn interpret_request_serializes_service_field_names() -> crate::error::Result<()> {
        let request = InterpretRequest::new(
            "volaba sobre una ciudad".to_owned(),
            "tranquilo".to_owned(),
            true,
            "vuelo.txt".to_owned(),
        );
        let body = serde_json::to_value(&request)?;
        assert_eq!(
            body,
            json!({
                "texto_sueno": "volaba sobre una ciudad",
                "contexto_emocional": "tranquilo",
                "save": true,
                "filename": "vuelo.txt",
                "offline": false,
            })
        );
        Ok(())
    }

    #[test]
    fn session_tolerates_aliased_field_names() -> crate::error::Result<()> {
        let session: Session = serde_json::from_value(json!({
            "_id": "s-1",
            "texto_sueno": "volaba sobre una ciudad",
            "resumen": "sueño de volar sobre una ciudad.",
            "image_url": "https://cdn.example.com/s-1.png",
            "follow_ups": [
                {"question": "¿qué significa volar?", "response": "libertad"}
            ],
            "fecha": "2026-01-04T03:12:00Z",
        }))?;
        assert_eq!(session.id, "s-1");
        assert_eq!(session.summary_text(), "sueño de volar sobre una ciudad.");
        assert_eq!(session.followups.len(), 1);
        assert_eq!(session.followups[0].question, "¿qué significa volar?");
        assert_eq!(session.followups[0].answer, "libertad");
        assert_eq!(session.created_at.as_deref(), Some("2026-01-04T03:12:00Z"));
        Ok(())
    }

    #[test]
    fn all_session_list_shapes_normalize_identically() -> crate::error::Result<()> {
        let record_a = json!({"sesion_id": "a", "texto_sueno": "uno"});
        let record_b = json!({"sesion_id": "b", "texto_sueno": "dos"});

        let bare = normalize_sessions(json!([record_a.clone(), record_b.clone()]))?;
        let wrapped = normalize_sessions(json!({"sessions": [record_a, record_b]}))?;
        // The keyed shape may omit the embedded identifier entirely.
        let keyed = normalize_sessions(json!({
            "a": {"texto_sueno": "uno"},
            "b": {"texto_sueno": "dos"},
        }))?;

        for shape in [&bare, &wrapped, &keyed] {
            assert_eq!(shape.len(), 2);
            let mut ids: Vec<&str> = shape.iter().map(|s| s.id.as_str()).collect();
            ids.sort_unstable();
            assert_eq!(ids, ["a", "b"]);
        }
        Ok(())
    }

    #[test]
    fn keyed_shape_prefers_embedded_identifier() -> crate::error::Result<()> {
        let sessions = normalize_sessions(json!({
            "key": {"id": "embedded", "texto_sueno": "uno"},
        }))?;
        assert_eq!(sessions[0].id, "embedded");
        Ok(())
    }

    #[test]
    fn scalar_payloads_normalize_to_nothing() -> crate::error::Result<()> {
        assert!(normalize_sessions(serde_json::Value::Null)?.is_empty());
        assert!(normalize_sessions(json!("no sessions"))?.is_empty());
        // Non-record values in a keyed map are not sessions.
        assert!(normalize_sessions(json!({"count": 3}))?.is_empty());
        Ok(())
    }

    #[test]
    fn inline_image_payloads_decode_identically() -> crate::error::Result<()> {
        let bytes = b"not actually a png";
        let encoded = base64::encode(bytes);
        let from_raw = image_payload(&encoded)?;
        let from_data_url = image_payload(&format!("data:image/png;base64,{encoded}"))?;
        assert_eq!(from_raw, from_data_url);
        assert_eq!(from_raw, ImagePayload::Inline(bytes.to_vec()));
        Ok(())
    }

    #[test]
    fn remote_image_payloads_pass_through() -> crate::error::Result<()> {
        let url = "https://cdn.example.com/dream.png";
        assert_eq!(image_payload(url)?, ImagePayload::Remote(url.to_owned()));
        Ok(())
    }

    #[test]
    fn malformed_inline_images_are_conversion_errors() {
        assert!(matches!(
            image_payload("%%% not base64 %%%"),
            Err(Error::Conversion(_))
        ));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let anonymous = User {
            email: "luna@example.com".to_owned(),
            name: Some(String::new()),
        };
        assert_eq!(anonymous.display_name(), "luna@example.com");

        let named = User {
            email: "luna@example.com".to_owned(),
            name: Some("Luna".to_owned()),
        };
        assert_eq!(named.display_name(), "Luna");
    }
}
