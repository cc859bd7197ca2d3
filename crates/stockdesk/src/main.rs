// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use stockdesk::config::{ClientConfig, LogFormat};
use stockdesk::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&cli.config);

    match stockdesk::run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("fatal: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &ClientConfig) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    // stdout carries command output; logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match config.log_format {
        LogFormat::Json => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();
        }
        LogFormat::Text => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}
