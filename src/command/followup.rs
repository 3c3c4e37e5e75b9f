// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::warn;

use crate::{api::Api, error::Result};

/// Ask a follow-up question about a dream session.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The session identifier (see `moonbound sessions`).
    #[clap()]
    id: String,

    /// Your question about the dream.
    #[clap()]
    question: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        let question = self.question.trim();
        let answer = ctx.api.followup(&self.id, question).await?;

        // The answer from the post call, shown right away; the transcript
        // below is reloaded from the server and is the authoritative record.
        println!("Q: {question}");
        println!("A: {}", answer.answer);

        match ctx.api.session(&self.id).await {
            Ok(session) => {
                println!();
                super::show::print_transcript(&session);
            }
            Err(e) => warn!("Could not reload the session after the follow-up: {}", e),
        }
        Ok(())
    }
}
