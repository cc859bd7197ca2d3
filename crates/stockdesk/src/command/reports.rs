// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stockdesk transactions`, `profile ...` and `dashboard`.

use super::Context;
use crate::api::envelope::Outcome;
use crate::api::models::{Dashboard, ProfileUpdate, Transaction, User};
use crate::error::ApiError;
use crate::paging::{PageController, PageFilter};

#[derive(Debug, clap::Args)]
pub struct TransactionsArgs {
    /// First day, `YYYY-MM-DD`.
    #[arg(long)]
    pub start: String,
    /// Last day (inclusive), `YYYY-MM-DD`.
    #[arg(long)]
    pub end: String,
    /// Only movements of this product id.
    #[arg(long)]
    pub product: Option<i64>,
    /// Include failed transactions as well.
    #[arg(long)]
    pub failures: bool,
}

#[derive(Debug, clap::Subcommand)]
pub enum ProfileCommand {
    /// Show the full profile.
    Show,
    /// Change profile fields; only values that differ are sent.
    Update(ProfileUpdateArgs),
}

#[derive(Debug, clap::Args)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Currency symbol used in reports.
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub receive_email: Option<bool>,
    #[arg(long)]
    pub low_stock_alert: Option<bool>,
}

impl From<&ProfileUpdateArgs> for ProfileUpdate {
    fn from(args: &ProfileUpdateArgs) -> Self {
        Self {
            full_name: args.full_name.clone(),
            phone_number: args.phone.clone(),
            receive_email: args.receive_email,
            receive_low_stock_alert: args.low_stock_alert,
            currency: args.currency.clone(),
        }
    }
}

pub async fn transactions(ctx: &Context, args: &TransactionsArgs) -> Result<i32, ApiError> {
    if !args.failures {
        let outcome = ctx.client.transactions(&args.start, &args.end, args.product).await?;
        return Ok(ctx.finish(outcome, |txs| print_transactions(txs)));
    }

    // Only the paged endpoint knows about failed transactions.
    let endpoint = ctx.client.paged_transactions(&args.start, &args.end, true)?;
    let filter = match args.product {
        Some(id) => PageFilter::new().param("productId", id),
        None => PageFilter::new(),
    };
    let pages = PageController::new(endpoint, ctx.page_size).with_filter(filter);
    ctx.finish_paged(pages, true, print_transactions).await
}

fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions in range.");
        return;
    }
    println!(
        "{:<6} {:<24} {:<24} {:<7} {:>8} {:>10} {:>9}  {}",
        "ID", "PRODUCT", "ORGANIZATION", "TYPE", "QTY", "PRICE", "REMAINING", "DATE"
    );
    for t in transactions {
        println!(
            "{:<6} {:<24} {:<24} {:<7} {:>8} {:>10.2} {:>9}  {}",
            t.id, t.product, t.organization, t.kind, t.quantity, t.price, t.remaining_quantity, t.date
        );
    }
}

pub async fn run_profile(ctx: &Context, cmd: &ProfileCommand) -> Result<i32, ApiError> {
    match cmd {
        ProfileCommand::Show => {
            let outcome = ctx.client.profile().await?;
            Ok(ctx.finish(outcome, print_profile))
        }
        ProfileCommand::Update(args) => {
            let current = match ctx.client.profile().await? {
                Outcome::Success { data, .. } => data,
                Outcome::Failure { message, .. } => {
                    eprintln!("error: {message}");
                    return Ok(1);
                }
            };
            let update = ProfileUpdate::diff(&current, ProfileUpdate::from(args));
            if update.is_empty() {
                println!("Nothing to update.");
                return Ok(0);
            }
            let outcome = ctx.client.update_profile(&update).await?;
            Ok(ctx.finish(outcome, |_| println!("Profile updated.")))
        }
    }
}

fn print_profile(user: &User) {
    println!("Name:             {}", user.full_name);
    println!("Email:            {}", user.email);
    println!("Phone:            {}", user.phone_number);
    println!("Role:             {}", user.user_type);
    println!("Currency:         {}", user.currency);
    println!("Email updates:    {}", yes_no(user.receive_email));
    println!("Low stock alerts: {}", yes_no(user.receive_low_stock_alert));
}

pub async fn dashboard(ctx: &Context) -> Result<i32, ApiError> {
    let outcome = ctx.client.dashboard().await?;
    Ok(ctx.finish(outcome, print_dashboard))
}

fn print_dashboard(d: &Dashboard) {
    println!("Products:           {}", d.product_count);
    println!("Low stock items:    {}", d.low_stock_items);
    println!("Active supplies:    {}", d.active_supplies);
    println!("Organizations:      {}", d.organization_count);
    println!("Pending orders:     {}", d.pending_orders);
    println!("Supply expense:     {:.2}", d.monthly_supply_expense);
    println!("Sales revenue:      {:.2}", d.monthly_sales_revenue);
    println!("Profit this month:  {:.2}", d.monthly_profit);
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
