mod embed;
mod inner;
mod rule;
mod text;

use crate::inner::DiscordSmbClientInner;

use std::sync::Arc;

use futures::{future::BoxFuture, prelude::*};
use serenity::{Client as SerenityClient, all::ShardManager};
use smb_command_table::CommandTableCache;
use smb_common::config::Config;
use smb_core::{error::ClientError, interface::client::SmbClient};
use thiserror::Error as ThisError;
use tokio::sync::Mutex;

#[derive(Debug, ThisError)]
pub enum DiscordClientError {
    #[error("{0} must not be zero")]
    ZeroId(&'static str),

    #[error("client has already been started")]
    AlreadyStarted,
}

pub struct DiscordSmbClient {
    discord: Arc<Mutex<Option<SerenityClient>>>,
    shard_manager: Arc<ShardManager>,
}

impl DiscordSmbClient {
    pub async fn new(token: &str, config: &Config, table: CommandTableCache) -> Result<DiscordSmbClient, ClientError> {
        let discord = DiscordSmbClientInner::new_as_serenity_client(token, config, table).await?;
        let shard_manager = discord.shard_manager.clone();
        Ok(DiscordSmbClient {
            discord: Arc::new(Mutex::new(Some(discord))),
            shard_manager,
        })
    }
}

impl SmbClient for DiscordSmbClient {
    fn execute(&self) -> BoxFuture<'static, Result<(), ClientError>> {
        let cloned = self.discord.clone();
        async move {
            let taken = cloned.lock().await.take();
            let Some(mut discord) = taken else {
                return Err(ClientError::by_internal(DiscordClientError::AlreadyStarted));
            };
            discord.start().map_err(ClientError::by_communication).await?;
            Ok(())
        }
        .boxed()
    }

    fn shutdown(&self) -> BoxFuture<'static, ()> {
        let shard_manager = self.shard_manager.clone();
        async move {
            shard_manager.shutdown_all().await;
        }
        .boxed()
    }
}
