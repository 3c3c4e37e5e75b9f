// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use std::{fs, path::PathBuf};

use async_trait::async_trait;
use clap::Parser;

use crate::{
    api::{self, Api},
    error::Result,
};

/// Submit a dream for interpretation.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// How the dream felt, to give the interpreter emotional context.
    #[arg(long, short, default_value = "")]
    context: String,

    /// Ask the service to keep a transcript file for this interpretation.
    #[arg(long)]
    save: bool,

    /// The transcript filename to use with --save.
    #[arg(long, default_value = "", requires = "save")]
    filename: String,

    /// Read the dream description from a text file instead of the command
    /// line.
    #[arg(long, short, value_hint = clap::ValueHint::FilePath, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Write the illustration to this path if the service returns one
    /// inline.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    image_out: Option<PathBuf>,

    /// The dream, described in your own words.
    #[clap()]
    text: Option<String>,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        let dream_text = match self.file {
            Some(path) => fs::read_to_string(path)?,
            None => self.text.unwrap_or_default(),
        };

        let request =
            api::InterpretRequest::new(dream_text, self.context, self.save, self.filename);
        let result = ctx.api.interpret(&request).await?;

        if result.interpretation.is_empty() {
            println!("The service returned no interpretation.");
        } else {
            println!("{}", result.interpretation);
        }

        if let Some(raw) = result.image_url.as_deref() {
            println!();
            super::deliver_image(raw, self.image_out.as_deref(), result.image_description.as_deref())?;
        }
        if let Some(saved) = result.saved_file.as_deref() {
            println!("The service kept a transcript at {saved}");
        }
        if let Some(id) = result.session_id.as_deref() {
            println!("\nSession {id} (continue with `moonbound followup {id} \"...\"`)");
        }
        Ok(())
    }
}
