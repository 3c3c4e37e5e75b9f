// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::warn;

use crate::{
    api::{self, Api},
    error::{self, Result},
    password::Prompt as _,
};

/// Sign in to the interpretation service with an existing account.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The email address of your account.
    #[clap()]
    email: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        let label = format!("Password for {}", self.email);
        let password = ctx
            .prompts
            .prompt(&label)
            .await?
            .ok_or(error::Password::NoPrompt)?;

        let credentials = api::Credentials {
            email: self.email,
            password,
        };
        ctx.store.login(&credentials).await?;

        if let Some(user) = ctx.store.user() {
            println!("Signed in as {}.", user.display_name());
        }
        if !ctx.store.remembers_session() {
            warn!("No durable token storage is available; this session ends with this process");
        }
        Ok(())
    }
}
