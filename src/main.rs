// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    missing_doc_code_examples,
    private_doc_tests,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod api;
mod auth;
mod client;
mod command;
mod error;
mod metadata;
mod password;
mod storage;

use std::{path::PathBuf, process, sync::Arc, time::Duration};

use api::Api as _;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use command::Command as _;
use error::Result;
use log::{error, warn};
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Command),
    Register(command::register::Command),
    Logout(command::logout::Command),
    Status(command::status::Command),
    Interpret(command::interpret::Command),
    Sessions(command::sessions::Command),
    Show(command::show::Command),
    Followup(command::followup::Command),
    Delete(command::delete::Command),
    Image(command::image::Command),
}

impl Command {
    /// Whether the command touches the user's data and therefore requires a
    /// signed-in session before it runs.
    const fn needs_auth(&self) -> bool {
        match self {
            Self::Login(_) | Self::Register(_) | Self::Logout(_) | Self::Status(_) => false,
            Self::Interpret(_)
            | Self::Sessions(_)
            | Self::Show(_)
            | Self::Followup(_)
            | Self::Delete(_)
            | Self::Image(_) => true,
        }
    }
}

#[async_trait]
impl command::Command for Command {
    async fn execute(
        self,
        ctx: &mut command::Context<impl api::Api + Send + Sync>,
    ) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(ctx).await,
            Self::Register(cmd) => cmd.execute(ctx).await,
            Self::Logout(cmd) => cmd.execute(ctx).await,
            Self::Status(cmd) => cmd.execute(ctx).await,
            Self::Interpret(cmd) => cmd.execute(ctx).await,
            Self::Sessions(cmd) => cmd.execute(ctx).await,
            Self::Show(cmd) => cmd.execute(ctx).await,
            Self::Followup(cmd) => cmd.execute(ctx).await,
            Self::Delete(cmd) => cmd.execute(ctx).await,
            Self::Image(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the MoonBound interpretation service.
    #[arg(long, env = "MOONBOUND_API_URL", default_value = metadata::DEFAULT_API_URL, value_parser = Url::parse)]
    api_url: Url,

    /// Turn off durable storage of the session token issued by login or
    /// registration.
    #[arg(long)]
    no_store_token: bool,

    /// Seconds to wait for the service before giving up on a request.
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// The path to the Pinentry program to use when prompting for a
    /// password.
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pinentry_program: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

async fn get_token_storage(args: &Args) -> Box<dyn storage::TokenStore> {
    if !args.no_store_token {
        #[cfg(feature = "secret-service")]
        match storage::SecretService::new(&args.api_url).await {
            Ok(secret_service_storage) => return Box::new(secret_service_storage),
            Err(e) => {
                warn!("We need to fall back to unencrypted file storage because we can't connect to the secret service: {}", e);
            }
        }

        #[cfg(feature = "keychain")]
        match storage::Keychain::new(&args.api_url) {
            Ok(keychain_storage) => return Box::new(keychain_storage),
            Err(e) => {
                warn!("We need to fall back to unencrypted file storage because we can't connect to Keychain: {}", e);
            }
        }

        if let Some(file_storage) = storage::File::new() {
            return Box::new(file_storage);
        }
        warn!("No project data directory is available; the session token will only be held in memory");
    }

    Box::new(storage::Memory::new())
}

async fn run(args: Args) -> Result<()> {
    let prompts: Vec<Box<dyn password::Prompt>> = vec![
        Box::new(args.pinentry_program.clone().map_or_else(
            password::PinentryPrompt::new,
            password::PinentryPrompt::new_with_executable,
        )),
        Box::new(password::RpasswordPrompt),
    ];

    let token_storage = get_token_storage(&args).await;
    let token = Arc::new(auth::TokenCell::new());
    let api = client::Http::new(
        args.api_url.clone(),
        Arc::clone(&token),
        Duration::from_secs(args.request_timeout),
    )?;

    let mut store = auth::Store::new(api.clone(), token_storage, token);
    store.hydrate().await;

    if args.command.needs_auth() {
        if !store.is_authenticated() {
            return Err(error::Error::NotAuthenticated);
        }
        // Advisory only; a failing health check never blocks a command.
        if let Err(e) = api.health().await {
            warn!("The interpretation service failed its health check: {}", e);
        }
    }

    let mut ctx = command::Context {
        api,
        store,
        prompts: Arc::new(prompts),
    };
    command::Command::execute(args.command, &mut ctx).await
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("MOONBOUND_LOG", "warn")
        .write_style("MOONBOUND_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        if let error::Error::Api(error::Api::Status {
            status: 401 | 403, ..
        }) = e
        {
            warn!("Your session may have expired; run `moonbound login` again");
        }
        process::exit(1);
    };
}
