// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommands: session, catalog, orders, organizations, reports.

pub mod catalog;
pub mod orders;
pub mod organizations;
pub mod reports;
pub mod session;

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::envelope::Outcome;
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::credential::store::FileTokenStore;
use crate::error::ApiError;
use crate::paging::{LoadError, Loaded, PageController, PageSource};

/// Exit code for a command interrupted with Ctrl-C.
const EXIT_CANCELLED: i32 = 130;

#[derive(Debug, clap::Parser)]
#[command(name = "stockdesk", version, about = "Inventory management API client")]
pub struct Cli {
    #[command(flatten)]
    pub config: ClientConfig,

    /// Print records as JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Sign in and store the session tokens.
    Login(session::LoginArgs),
    /// Create a new account.
    Register(session::RegisterArgs),
    /// Forget the stored session tokens.
    Logout,
    /// Show who the stored session belongs to.
    Whoami,
    /// List and manage products.
    #[command(subcommand)]
    Products(catalog::ProductsCommand),
    /// List and manage product categories.
    #[command(subcommand)]
    Categories(catalog::CategoriesCommand),
    /// List, place, approve and reject orders.
    #[command(subcommand)]
    Orders(orders::OrdersCommand),
    /// List and manage suppliers and customers.
    #[command(subcommand)]
    Organizations(organizations::OrganizationsCommand),
    /// List stock movements between two days.
    Transactions(reports::TransactionsArgs),
    /// Show or update the signed-in user's profile.
    #[command(subcommand)]
    Profile(reports::ProfileCommand),
    /// Show headline inventory figures.
    Dashboard,
}

impl Command {
    /// Everything except signing in, registering and signing out needs a
    /// stored session.
    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::Login(_) | Self::Register(_) | Self::Logout)
    }
}

/// Shared state handed to every subcommand.
pub struct Context {
    pub client: ApiClient,
    pub json: bool,
    pub page_size: u32,
}

impl Context {
    /// Print a successful outcome with `render` (or as JSON), or the
    /// server's message for a failed one. Returns the exit code.
    pub fn finish<T: Serialize>(&self, outcome: Outcome<T>, render: impl FnOnce(&T)) -> i32 {
        match outcome {
            Outcome::Success { data, .. } => {
                if self.json {
                    print_json(&data);
                } else {
                    render(&data);
                }
                0
            }
            Outcome::Failure { message, .. } => {
                eprintln!("error: {message}");
                1
            }
        }
    }

    /// Drive `pages` through one page, or all of them with `all`, then print
    /// what was loaded.
    pub async fn finish_paged<T, S>(
        &self,
        mut pages: PageController<T, S>,
        all: bool,
        render: impl FnOnce(&[T]),
    ) -> Result<i32, ApiError>
    where
        T: crate::paging::Identified + Serialize + Send,
        S: PageSource<T>,
    {
        let loaded = if all {
            pages.load_all().await.map(|_| ())
        } else {
            pages.load_next().await.map(|_: Loaded| ())
        };
        match loaded {
            Ok(()) => {}
            Err(LoadError::Api(e)) => return Err(e),
            Err(LoadError::Failed { message }) => {
                eprintln!("error: {message}");
                return Ok(1);
            }
        }

        let more = !pages.is_exhausted();
        let items = pages.into_items();
        if self.json {
            print_json(&items);
        } else {
            render(&items);
            if more {
                println!("(more results available; pass --all to load everything)");
            }
        }
        Ok(0)
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("error: {e}"),
    }
}

/// Run one CLI invocation. Returns the process exit code.
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let store = Arc::new(FileTokenStore::open(cli.config.credentials_path())?);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let client = ApiClient::from_config(&cli.config, store)?.with_cancellation(cancel);
    let ctx = Context { client, json: cli.json, page_size: cli.config.page_size.max(1) };

    if cli.command.requires_session() {
        if let Err(e) = ctx.client.require_session() {
            eprintln!("error: {e}");
            return Ok(1);
        }
    }

    let result = match cli.command {
        Command::Login(ref args) => session::login(&ctx, args).await,
        Command::Register(ref args) => session::register(&ctx, args).await,
        Command::Logout => Ok(session::logout(&ctx)),
        Command::Whoami => session::whoami(&ctx).await,
        Command::Products(ref cmd) => catalog::run_products(&ctx, cmd).await,
        Command::Categories(ref cmd) => catalog::run_categories(&ctx, cmd).await,
        Command::Orders(ref cmd) => orders::run(&ctx, cmd).await,
        Command::Organizations(ref cmd) => organizations::run(&ctx, cmd).await,
        Command::Transactions(ref args) => reports::transactions(&ctx, args).await,
        Command::Profile(ref cmd) => reports::run_profile(&ctx, cmd).await,
        Command::Dashboard => reports::dashboard(&ctx).await,
    };

    Ok(match result {
        Ok(code) => code,
        Err(ApiError::Cancelled) => {
            eprintln!("cancelled");
            EXIT_CANCELLED
        }
        Err(e @ ApiError::Refresh(_)) => {
            tracing::debug!(code = %e.code(), "session ended");
            eprintln!("error: {e}");
            eprintln!("run `stockdesk login` to sign in again");
            1
        }
        Err(e) => {
            tracing::debug!(code = %e.code(), "command failed");
            eprintln!("error: {e}");
            1
        }
    })
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
