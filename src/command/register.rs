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

/// Create a new account on the interpretation service and sign in.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// A display name for the new account.
    #[arg(long, short, default_value = "")]
    name: String,

    /// The email address to register.
    #[clap()]
    email: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        let label = format!("Choose a password for {}", self.email);
        let password = ctx
            .prompts
            .prompt(&label)
            .await?
            .ok_or(error::Password::NoPrompt)?;

        let registration = api::Registration {
            credentials: api::Credentials {
                email: self.email,
                password,
            },
            name: self.name,
        };
        ctx.store.register(&registration).await?;

        if let Some(user) = ctx.store.user() {
            println!("Welcome, {}.", user.display_name());
        }
        if !ctx.store.remembers_session() {
            warn!("No durable token storage is available; this session ends with this process");
        }
        Ok(())
    }
}
