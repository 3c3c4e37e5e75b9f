// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use clap::Parser;
use tokio::task;

use crate::{api::Api, error::Result};

/// Delete a dream session from the server.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// Delete without asking for confirmation.
    #[arg(long, short = 'y')]
    yes: bool,

    /// The session identifier to delete.
    #[clap()]
    id: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        if !self.yes && !confirm(format!("Delete session {}?", self.id)).await? {
            return Err(crate::error::Error::Cancelled);
        }

        // Nothing is reported gone until the server agrees it is.
        ctx.api.delete_session(&self.id).await?;
        println!("Deleted session {}.", self.id);
        Ok(())
    }
}

async fn confirm(question: String) -> Result<bool> {
    task::spawn_blocking(move || {
        print!("{question} [y/N] ");
        io::stdout().flush()?;
        let mut reply = String::new();
        let _ = io::stdin().lock().read_line(&mut reply)?;
        Ok(matches!(
            reply.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    })
    .await?
}
