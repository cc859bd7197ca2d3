// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stockdesk orders ...`

use super::Context;
use crate::api::envelope::Outcome;
use crate::api::models::{NewOrder, Order, OrderHistory, OrderType};
use crate::error::ApiError;
use crate::paging::{PageController, PageFilter};

#[derive(Debug, clap::Subcommand)]
pub enum OrdersCommand {
    /// List orders awaiting approval.
    List,
    /// List approved and rejected orders.
    History(HistoryArgs),
    /// Place a new order.
    Add(NewOrderArgs),
    /// Approve a pending order, booking it against stock.
    Approve { id: i64 },
    /// Reject a pending order.
    Reject { id: i64 },
}

#[derive(Debug, clap::Args)]
pub struct HistoryArgs {
    /// Match against product or organization.
    #[arg(long)]
    pub search: Option<String>,
    /// Only supply or only sale orders.
    #[arg(long = "type", value_enum)]
    pub kind: Option<OrderType>,
    /// Keep loading pages until everything is listed.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, clap::Args)]
pub struct NewOrderArgs {
    /// Product id.
    #[arg(long)]
    pub product: i64,
    /// Supplier or customer organization id.
    #[arg(long)]
    pub organization: i64,
    #[arg(long)]
    pub quantity: i64,
    /// Unit price.
    #[arg(long)]
    pub price: f64,
    /// ISO-8601 timestamp.
    #[arg(long)]
    pub date: String,
    #[arg(long = "type", value_enum)]
    pub kind: OrderType,
}

pub async fn run(ctx: &Context, cmd: &OrdersCommand) -> Result<i32, ApiError> {
    match cmd {
        OrdersCommand::List => {
            let outcome = ctx.client.orders().await?;
            Ok(ctx.finish(outcome, |orders| print_pending(orders)))
        }
        OrdersCommand::History(args) => {
            let mut filter = PageFilter::new();
            if let Some(ref search) = args.search {
                filter = filter.search(search.as_str());
            }
            if let Some(kind) = args.kind {
                filter = filter.param("type", kind);
            }
            let pages =
                PageController::new(ctx.client.paged_orders(true), ctx.page_size).with_filter(filter);
            ctx.finish_paged(pages, args.all, print_history).await
        }
        OrdersCommand::Add(args) => {
            let order = NewOrder {
                product_id: args.product,
                organization_id: args.organization,
                quantity: args.quantity,
                price: args.price,
                date: args.date.clone(),
                kind: args.kind,
            };
            let outcome = ctx.client.create_order(&order).await?;
            Ok(ctx.finish(outcome, |_| println!("Placed {} order.", args.kind)))
        }
        OrdersCommand::Approve { id } => {
            let Some(order) = find_pending(ctx, *id).await? else {
                return Ok(1);
            };
            let outcome = ctx.client.approve_order(&order).await?;
            Ok(ctx.finish(outcome, |_| println!("Approved order {id}.")))
        }
        OrdersCommand::Reject { id } => {
            let outcome = ctx.client.reject_order(*id).await?;
            Ok(ctx.finish(outcome, |_| println!("Rejected order {id}.")))
        }
    }
}

// Approval needs the full order, which only the pending list carries.
async fn find_pending(ctx: &Context, id: i64) -> Result<Option<Order>, ApiError> {
    match ctx.client.orders().await? {
        Outcome::Success { data, .. } => {
            let order = data.into_iter().find(|o| o.id == id);
            if order.is_none() {
                eprintln!("error: no pending order with id {id}");
            }
            Ok(order)
        }
        Outcome::Failure { message, .. } => {
            eprintln!("error: {message}");
            Ok(None)
        }
    }
}

fn print_pending(orders: &[Order]) {
    if orders.is_empty() {
        println!("No pending orders.");
        return;
    }
    println!(
        "{:<6} {:<7} {:>8} {:>6} {:>10} {:>10}  {}",
        "ID", "TYPE", "PRODUCT", "ORG", "QTY", "PRICE", "DATE"
    );
    for o in orders {
        println!(
            "{:<6} {:<7} {:>8} {:>6} {:>10} {:>10.2}  {}",
            o.id, o.kind, o.product_id, o.organization_id, o.quantity, o.price, o.date
        );
    }
}

fn print_history(history: &[OrderHistory]) {
    if history.is_empty() {
        println!("No processed orders.");
        return;
    }
    println!("{:<6} {:<7} {:<24} {:<24} {:>8}  {:<8} {}", "ID", "TYPE", "PRODUCT", "ORGANIZATION", "QTY", "RESULT", "DETAIL");
    for h in history {
        let product = h.product_name.clone().unwrap_or_else(|| h.product_id.to_string());
        let org = h.organization_name.clone().unwrap_or_else(|| h.organization_id.to_string());
        let result = if h.is_successfull { "ok" } else { "failed" };
        println!(
            "{:<6} {:<7} {:<24} {:<24} {:>8}  {:<8} {}",
            h.id, h.kind, product, org, h.quantity, result, h.detail
        );
    }
}
