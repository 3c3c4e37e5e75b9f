// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use async_trait::async_trait;
use clap::Parser;

use crate::{
    api::{self, Api},
    error::Result,
};

/// Generate an illustration for a dream description.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The artistic style to render the illustration in.
    #[arg(long, short, default_value = api::DEFAULT_IMAGE_STYLE)]
    style: String,

    /// Write the illustration to this path if the service returns one
    /// inline.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    image_out: Option<PathBuf>,

    /// The dream to illustrate.
    #[clap()]
    description: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        let request = api::ImageRequest {
            description: self.description,
            style: self.style,
        };
        let image = ctx.api.generate_image(&request).await?;

        let caption = image.description.or(image.prompt);
        match image.image.as_deref() {
            Some(raw) => super::deliver_image(raw, self.image_out.as_deref(), caption.as_deref())?,
            None => println!("The service returned no illustration."),
        }
        Ok(())
    }
}
