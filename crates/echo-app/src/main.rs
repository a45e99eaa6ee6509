//! Echo harness binary - composition root.
//!
//! 1. Parse the CLI and load configuration from TOML
//! 2. Install the tracing subscriber
//! 3. `insert`: load a page fixture into a `MemoryPage`, send the report
//!    through the bridge to the content script, wait out the toast and
//!    print the outcome
//! 4. `config`: print the effective configuration

mod cli;
mod harness;

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;

use echo_bridge::{InsertClient, InsertReply, PopupSession};
use echo_core::config::EchoConfig;
use echo_inject::dom::memory::{ElementSnapshot, PageFixture};
use echo_inject::toast::TOAST_MARKER;
use echo_inject::{MemoryClipboard, MemoryPage};

use crate::cli::{CliArgs, Command, InsertArgs};
use crate::harness::PageChannel;

/// What `echo insert` prints.
#[derive(Debug, Serialize)]
struct InsertSummary {
    response: serde_json::Value,
    reply: String,
    clipboard: Option<String>,
    toast_nodes: usize,
    page: Vec<ElementSnapshot>,
}

/// Load the config file when it exists; a missing file means defaults.
fn load_config(path: &Path) -> Result<EchoConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(EchoConfig::load(path)?)
    } else {
        Ok(EchoConfig::default())
    }
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run_insert(
    args: InsertArgs,
    config: EchoConfig,
) -> Result<InsertSummary, Box<dyn std::error::Error>> {
    let text = args.read_text()?;
    let fixture: PageFixture = serde_json::from_str(&std::fs::read_to_string(&args.page)?)?;
    let page = MemoryPage::from_fixture(&fixture);
    let clipboard = MemoryClipboard::new();
    tracing::info!(
        page = %args.page.display(),
        elements = fixture.elements.len(),
        "Page fixture loaded"
    );

    let channel = PageChannel::new(page.clone(), clipboard.clone(), config.clone(), !args.lazy);
    let client = InsertClient::new(channel, &config.bridge);

    let mut session = PopupSession::open();
    session.set_report(text);
    let reply = client.insert_current(&mut session, args.tab).await;
    session.close();
    let reply = reply?;

    if reply == InsertReply::CopiedToClipboard {
        // Let the clipboard write and the toast lifetime run to completion.
        let lifetime = config.toast.display_duration()
            + config.toast.animation_duration()
            + Duration::from_millis(50);
        tokio::time::sleep(lifetime).await;
        tokio::task::yield_now().await;
    }

    Ok(InsertSummary {
        response: serde_json::json!({ "success": reply == InsertReply::Inserted }),
        reply: reply.to_string(),
        clipboard: clipboard.contents(),
        toast_nodes: page.elements_with_attribute(TOAST_MARKER).len(),
        page: page.snapshot(),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let config = load_config(&config_file)?;

    init_tracing(&args.resolve_log_filter(&config.general.log_level));
    tracing::debug!(path = %config_file.display(), "Configuration resolved");

    match args.command {
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Command::Insert(insert) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let local = tokio::task::LocalSet::new();
            let summary = local.block_on(&runtime, run_insert(insert, config))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
