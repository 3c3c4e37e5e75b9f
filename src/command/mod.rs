// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use std::{fs, path::Path, sync::Arc};

use async_trait::async_trait;

use crate::{
    api::{self, Api, ImagePayload},
    auth,
    error::Result,
    password,
};

pub(crate) mod delete;
pub(crate) mod followup;
pub(crate) mod image;
pub(crate) mod interpret;
pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod register;
pub(crate) mod sessions;
pub(crate) mod show;
pub(crate) mod status;

/// Everything a view needs: the typed API surface, the auth store, and the
/// password prompt chain.
pub(crate) struct Context<A> {
    pub(crate) api: A,
    pub(crate) store: auth::Store<A>,
    pub(crate) prompts: Arc<Vec<Box<dyn password::Prompt>>>,
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, ctx: &mut Context<impl Api + Send + Sync>) -> Result<()>;
}

/// Hands a returned illustration to the user: inline payloads are written to
/// `target` (or summarized when no target was given), remote ones are
/// printed for the user to fetch themselves.
pub(crate) fn deliver_image(raw: &str, target: Option<&Path>, caption: Option<&str>) -> Result<()> {
    match api::image_payload(raw)? {
        ImagePayload::Remote(location) => println!("Illustration: {location}"),
        ImagePayload::Inline(bytes) => match target {
            Some(path) => {
                fs::write(path, bytes)?;
                println!("Illustration written to {}", path.display());
            }
            None => println!(
                "The service returned an inline illustration ({} bytes); pass --image-out FILE to keep it",
                bytes.len()
            ),
        },
    }
    if let Some(text) = caption {
        println!("  \u{201c}{text}\u{201d}");
    }
    Ok(())
}
