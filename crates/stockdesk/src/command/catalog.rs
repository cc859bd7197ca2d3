// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stockdesk products ...` and `stockdesk categories ...`.

use super::{print_json, Context};
use crate::api::envelope::Outcome;
use crate::api::models::{Category, NewProduct, Product, Supply};
use crate::error::ApiError;
use crate::paging::{PageController, PageFilter, PageQuery, PageSource};

#[derive(Debug, clap::Subcommand)]
pub enum ProductsCommand {
    /// List one page of products.
    List(ProductListArgs),
    /// Create a product.
    Add(NewProductArgs),
    /// Record stock received for a product.
    Supply(SupplyArgs),
}

#[derive(Debug, clap::Args)]
pub struct ProductListArgs {
    /// Match against SKU or name.
    #[arg(long)]
    pub search: Option<String>,
    /// Only products in this category id.
    #[arg(long)]
    pub category: Option<i64>,
    /// 1-indexed page number.
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Overrides the global page size for this listing.
    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(Debug, clap::Args)]
pub struct NewProductArgs {
    #[arg(long)]
    pub sku: String,
    #[arg(long)]
    pub name: String,
    /// Category id.
    #[arg(long)]
    pub category: i64,
}

#[derive(Debug, clap::Args)]
pub struct SupplyArgs {
    /// Product id.
    pub id: i64,
    #[arg(long)]
    pub quantity: i64,
    /// ISO-8601 timestamp of the delivery.
    #[arg(long)]
    pub date: String,
}

#[derive(Debug, clap::Subcommand)]
pub enum CategoriesCommand {
    /// List categories, optionally filtered by name.
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a category.
    Add { name: String },
}

pub async fn run_products(ctx: &Context, cmd: &ProductsCommand) -> Result<i32, ApiError> {
    match cmd {
        ProductsCommand::List(args) => list_products(ctx, args).await,
        ProductsCommand::Add(args) => {
            let product = NewProduct {
                sku: args.sku.clone(),
                name: args.name.clone(),
                category_id: args.category,
            };
            let outcome = ctx.client.create_product(&product).await?;
            Ok(ctx.finish(outcome, |_| println!("Created product '{}'.", args.sku)))
        }
        ProductsCommand::Supply(args) => {
            let supply = Supply { quantity: args.quantity, date: args.date.clone() };
            let outcome = ctx.client.add_supply(args.id, &supply).await?;
            Ok(ctx.finish(outcome, |_| {
                println!("Added {} to product {}.", args.quantity, args.id)
            }))
        }
    }
}

async fn list_products(ctx: &Context, args: &ProductListArgs) -> Result<i32, ApiError> {
    let mut filter = PageFilter::new();
    if let Some(ref search) = args.search {
        filter = filter.search(search.as_str());
    }
    if let Some(category) = args.category {
        filter = filter.param("categoryId", category);
    }
    let query = PageQuery {
        page_number: args.page.max(1),
        page_size: args.page_size.unwrap_or(ctx.page_size).max(1),
        filter,
    };

    let page = match ctx.client.paged_products().fetch_page(&query).await? {
        Outcome::Success { data, .. } => data,
        Outcome::Failure { message, .. } => {
            eprintln!("error: {message}");
            return Ok(1);
        }
    };

    if ctx.json {
        print_json(&page.items);
        return Ok(0);
    }
    print_products(&page.items);
    match page.showing() {
        Some((first, last, total)) => println!("Showing {first} - {last} of {total}"),
        None => println!("No products found."),
    }
    Ok(0)
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        return;
    }
    println!("{:<6} {:<14} {:<30} {:>8} {:>9}", "ID", "SKU", "NAME", "QTY", "CATEGORY");
    println!("{}", "-".repeat(71));
    for p in products {
        println!(
            "{:<6} {:<14} {:<30} {:>8} {:>9}",
            p.id, p.sku, p.name, p.total_quantity, p.category_id
        );
    }
}

pub async fn run_categories(ctx: &Context, cmd: &CategoriesCommand) -> Result<i32, ApiError> {
    match cmd {
        CategoriesCommand::List { search: Some(search) } => {
            let pages = PageController::new(ctx.client.paged_categories(), ctx.page_size)
                .with_filter(PageFilter::new().search(search.as_str()));
            ctx.finish_paged(pages, true, print_categories).await
        }
        CategoriesCommand::List { search: None } => {
            let outcome = ctx.client.categories().await?;
            Ok(ctx.finish(outcome, |categories| print_categories(categories)))
        }
        CategoriesCommand::Add { name } => {
            let outcome = ctx.client.create_category(name).await?;
            Ok(ctx.finish(outcome, |_| println!("Created category '{name}'.")))
        }
    }
}

fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories found.");
        return;
    }
    println!("{:<6} {}", "ID", "NAME");
    for c in categories {
        println!("{:<6} {}", c.id, c.name);
    }
}
