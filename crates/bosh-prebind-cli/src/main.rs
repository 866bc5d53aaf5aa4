// SPDX-License-Identifier: AGPL-3.0-only

//! Command-line BOSH session pre-bind.
//!
//! Runs the handshake against a connection manager and prints the
//! `(jid, sid, rid)` triple, typically for a web page that attaches a
//! browser-side XMPP client to the pre-established session.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use bosh_prebind::{BoshClient, BoshConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod config;

use config::FileConfig;

/// Pre-bind an authenticated XMPP session over BOSH
#[derive(Parser)]
#[command(name = "bosh-prebind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JID to authenticate, e.g. user@example.com or user@example.com/resource
    #[arg(short, long)]
    jid: Option<String>,

    /// Account password (falls back to $BOSH_PASSWORD, then a prompt)
    #[arg(short, long)]
    password: Option<String>,

    /// BOSH connection-manager endpoint, e.g. https://example.com:5280/http-bind
    #[arg(short = 'u', long)]
    service_url: Option<String>,

    /// BOSH long-poll wait hint in seconds
    #[arg(long)]
    wait: Option<u32>,

    /// BOSH hold hint (requests the manager may keep pending)
    #[arg(long)]
    hold: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let file = FileConfig::load()?;

    let jid = cli
        .jid
        .or(file.jid)
        .context("No JID given; pass --jid or set one in the config file")?;
    let service_url = cli
        .service_url
        .or(file.service_url)
        .context("No service URL given; pass --service-url or set one in the config file")?;
    let password = match cli.password {
        Some(password) => password,
        None => match std::env::var("BOSH_PASSWORD") {
            Ok(password) => password,
            Err(_) => prompt_password(&jid)?,
        },
    };

    let mut bosh = BoshConfig::new(jid, password, service_url);
    if let Some(wait) = cli.wait.or(file.wait) {
        bosh = bosh.with_wait(wait);
    }
    if let Some(hold) = cli.hold.or(file.hold) {
        bosh = bosh.with_hold(hold);
    }
    if let Some(secs) = cli.timeout_secs.or(file.timeout_secs) {
        bosh = bosh.with_timeout(Duration::from_secs(secs));
    }

    info!(jid = %bosh.jid, url = %bosh.service_url, "pre-binding BOSH session");
    let session = BoshClient::new(&bosh)?.connect().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("jid: {}", session.jid);
        println!("sid: {}", session.sid);
        println!("rid: {}", session.rid);
    }

    Ok(())
}

/// Ask for the password on the terminal.
fn prompt_password(jid: &str) -> Result<String> {
    eprint!("Password for {jid}: ");
    std::io::stderr().flush()?;
    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .context("Failed to read password from stdin")?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
