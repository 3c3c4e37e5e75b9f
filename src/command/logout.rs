// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{api::Api, error::Result};

/// Sign out and forget the saved session token.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        ctx.store.logout().await;
        println!("Signed out.");
        Ok(())
    }
}
