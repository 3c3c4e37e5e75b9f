// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{api::Api, error::Result};

/// Check that the service is reachable and show who is signed in.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        match ctx.api.health().await {
            Ok(()) => println!("Service:  reachable"),
            Err(e) => println!("Service:  unreachable ({e})"),
        }
        match ctx.store.user() {
            Some(user) => println!("Account:  {} <{}>", user.display_name(), user.email),
            None => println!("Account:  not signed in"),
        }
        Ok(())
    }
}
