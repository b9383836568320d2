mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use smb_command_table::{CommandTableCache, HttpResponseSource};
use smb_common::config::load_config;
use smb_core::interface::client::SmbClient;
use smb_discord_client::DiscordSmbClient;
use tokio::{select, spawn};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = cli::Arguments::parse();
    let config = load_config(&args.config)?;

    // コマンドテーブル
    let table = CommandTableCache::new();
    let source = HttpResponseSource::new(config.responses.url.clone(), config.responses.timeout())?;
    let refresh_task = spawn(table.run(Arc::new(source), config.responses.refresh_interval()));

    // Discord
    info!("starting Discord client");
    let discord_client = DiscordSmbClient::new(&args.token, &config, table.clone()).await?;
    let discord_task = spawn(discord_client.execute());

    let result = select! {
        joined = discord_task => {
            warn!("Discord client stopped");
            joined.map_err(anyhow::Error::from).and_then(|r| r.map_err(anyhow::Error::from))
        }
        signal = shutdown_signal() => {
            info!("received {signal}, shutting down");
            discord_client.shutdown().await;
            Ok(())
        }
    };

    refresh_task.abort();
    result
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let (Ok(mut interrupt), Ok(mut terminate)) = (signal(SignalKind::interrupt()), signal(SignalKind::terminate()))
    else {
        warn!("cannot install signal handlers, falling back to ctrl-c");
        return ctrl_c().await;
    };
    select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "ctrl-c",
        Err(err) => {
            warn!("cannot listen for ctrl-c: {err}");
            std::future::pending().await
        }
    }
}
