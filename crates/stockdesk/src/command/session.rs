// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stockdesk login`, `register`, `logout`, `whoami`.

use super::Context;
use crate::api::models::Registration;
use crate::error::ApiError;

#[derive(Debug, clap::Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    /// Account password. Prefer the env var to keep it out of shell history.
    #[arg(long, env = "STOCKDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, clap::Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "STOCKDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub full_name: String,
    #[arg(long)]
    pub phone: String,
}

pub async fn login(ctx: &Context, args: &LoginArgs) -> Result<i32, ApiError> {
    let outcome = ctx.client.login(&args.email, &args.password).await?;
    Ok(ctx.finish(outcome, |_| println!("Signed in as {}.", args.email)))
}

pub async fn register(ctx: &Context, args: &RegisterArgs) -> Result<i32, ApiError> {
    let registration = Registration {
        email: args.email.clone(),
        password: args.password.clone(),
        full_name: args.full_name.clone(),
        phone_number: args.phone.clone(),
    };
    let outcome = ctx.client.register(&registration).await?;
    Ok(ctx.finish(outcome, |_| {
        println!("Registered {}. Run `stockdesk login` to sign in.", args.email)
    }))
}

pub fn logout(ctx: &Context) -> i32 {
    let was_signed_in = ctx.client.is_signed_in();
    ctx.client.logout();
    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    0
}

pub async fn whoami(ctx: &Context) -> Result<i32, ApiError> {
    let outcome = ctx.client.profile().await?;
    Ok(ctx.finish(outcome, |user| {
        if user.user_type.is_empty() {
            println!("{} <{}>", user.full_name, user.email);
        } else {
            println!("{} <{}> ({})", user.full_name, user.email, user.user_type);
        }
    }))
}
