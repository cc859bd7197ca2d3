// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stockdesk organizations ...`

use super::Context;
use crate::api::models::{NewOrganization, Organization};
use crate::error::ApiError;
use crate::paging::{PageController, PageFilter};

#[derive(Debug, clap::Subcommand)]
pub enum OrganizationsCommand {
    /// List organizations a page at a time.
    List(ListArgs),
    /// Register a supplier or customer.
    Add(NewOrganizationArgs),
    /// Remove an organization.
    Delete { id: i64 },
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    #[arg(long)]
    pub search: Option<String>,
    /// Keep loading pages until everything is listed.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, clap::Args)]
pub struct NewOrganizationArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub address: String,
}

pub async fn run(ctx: &Context, cmd: &OrganizationsCommand) -> Result<i32, ApiError> {
    match cmd {
        OrganizationsCommand::List(args) => {
            let filter = match args.search {
                Some(ref search) => PageFilter::new().search(search.as_str()),
                None => PageFilter::new(),
            };
            let pages = PageController::new(ctx.client.paged_organizations(), ctx.page_size)
                .with_filter(filter);
            ctx.finish_paged(pages, args.all, print_organizations).await
        }
        OrganizationsCommand::Add(args) => {
            let organization = NewOrganization {
                name: args.name.clone(),
                email: args.email.clone(),
                phone: args.phone.clone(),
                address: args.address.clone(),
            };
            let outcome = ctx.client.create_organization(&organization).await?;
            Ok(ctx.finish(outcome, |_| println!("Added organization '{}'.", args.name)))
        }
        OrganizationsCommand::Delete { id } => {
            let outcome = ctx.client.delete_organization(*id).await?;
            Ok(ctx.finish(outcome, |_| println!("Deleted organization {id}.")))
        }
    }
}

fn print_organizations(organizations: &[Organization]) {
    if organizations.is_empty() {
        println!("No organizations found.");
        return;
    }
    println!("{:<6} {:<28} {:<28} {:<16} {}", "ID", "NAME", "EMAIL", "PHONE", "ADDRESS");
    for o in organizations {
        println!("{:<6} {:<28} {:<28} {:<16} {}", o.id, o.name, o.email, o.phone, o.address);
    }
}
