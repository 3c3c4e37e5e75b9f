// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use async_trait::async_trait;
use clap::Parser;

use crate::{
    api::{Api, Session},
    error::Result,
};

/// Show one dream session as a conversation transcript.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// Write the session's illustration to this path if it is stored
    /// inline.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    image_out: Option<PathBuf>,

    /// The session identifier (see `moonbound sessions`).
    #[clap()]
    id: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        let session = ctx.api.session(&self.id).await?;
        print_transcript(&session);
        if let Some(raw) = session.image_url.as_deref() {
            println!();
            super::deliver_image(
                raw,
                self.image_out.as_deref(),
                session.image_description.as_deref(),
            )?;
        }
        Ok(())
    }
}

/// Renders a session the way the conversation happened: the dream, the
/// interpretation, then every follow-up exchange in order.
pub(crate) fn print_transcript(session: &Session) {
    println!("Session {}", session.id);
    if let Some(when) = session.created_at.as_deref() {
        println!("Recorded {}", super::sessions::format_when(when));
    }

    if !session.dream_text.is_empty() {
        println!("\nDream:\n{}", indented(&session.dream_text));
    }
    if let Some(feeling) = session
        .emotional_context
        .as_deref()
        .filter(|context| !context.is_empty())
    {
        println!("\nFeeling: {feeling}");
    }
    if let Some(interpretation) = session
        .interpretation
        .as_deref()
        .filter(|interpretation| !interpretation.is_empty())
    {
        println!("\nInterpretation:\n{}", indented(interpretation));
    }

    for entry in &session.followups {
        println!();
        match entry.timestamp.as_deref() {
            Some(when) => println!(
                "Q ({}): {}",
                super::sessions::format_when(when),
                entry.question
            ),
            None => println!("Q: {}", entry.question),
        }
        println!("A: {}", entry.answer);
    }
}

fn indented(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
