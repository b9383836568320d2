use crate::{
    embed::build_repost_embed,
    rule::{CommandReply, RepostDecision, RepostRule, RoleChange, VoiceRoleRule, decide_reply, user_count_reply},
    text::{MAX_MESSAGE_LENGTH, truncate_for_discord},
};

use std::{
    fmt::Display,
    sync::atomic::{AtomicBool, Ordering},
};

use futures::{FutureExt, TryFutureExt, future::BoxFuture};
use serenity::{
    Client as SerenityClient,
    all::{
        ActivityData, Context, CreateMessage, EventHandler, GatewayIntents, Message as SerenityMessage, Reaction,
        Ready, User, UserId, VoiceState,
    },
};
use smb_command_table::CommandTableCache;
use smb_common::config::{Config, status::ConfigStatus};
use smb_core::error::ClientError;
use tokio::{
    spawn,
    sync::{Mutex, RwLock},
    time::sleep,
};
use tracing::{debug, error, info, warn};

const VOICE_ROLE_REASON: &str = "voice channel presence";

/// 1 回に取得するリアクションユーザー数の上限(API の最大値)。
const REACTION_USERS_LIMIT: u8 = 100;

#[derive(Debug)]
pub struct DiscordSmbClientInner {
    bot_user: RwLock<Option<User>>,
    presence_started: AtomicBool,
    repost_lock: Mutex<()>,
    table: CommandTableCache,
    status: ConfigStatus,
    voice_role: Option<VoiceRoleRule>,
    repost: Option<RepostRule>,
}

impl EventHandler for DiscordSmbClientInner {
    fn ready<'a, 't>(&'a self, ctx: Context, ready: Ready) -> BoxFuture<'t, ()>
    where
        'a: 't,
        Self: 't,
    {
        do_event(self.on_ready(ctx, ready))
    }

    fn message<'a, 't>(&'a self, ctx: Context, new_message: SerenityMessage) -> BoxFuture<'t, ()>
    where
        'a: 't,
        Self: 't,
    {
        do_event(self.on_message(ctx, new_message))
    }

    fn voice_state_update<'a, 't>(&'a self, ctx: Context, old: Option<VoiceState>, new: VoiceState) -> BoxFuture<'t, ()>
    where
        'a: 't,
        Self: 't,
    {
        do_event(self.on_voice_state_update(ctx, old, new))
    }

    fn reaction_add<'a, 't>(&'a self, ctx: Context, add_reaction: Reaction) -> BoxFuture<'t, ()>
    where
        'a: 't,
        Self: 't,
    {
        do_event(self.on_reaction_add(ctx, add_reaction))
    }
}

impl DiscordSmbClientInner {
    pub async fn new_as_serenity_client(
        token: &str,
        config: &Config,
        table: CommandTableCache,
    ) -> Result<SerenityClient, ClientError> {
        let voice_role = config
            .voice_role
            .as_ref()
            .map(VoiceRoleRule::try_from)
            .transpose()
            .map_err(ClientError::by_internal)?;
        let repost = config
            .repost
            .as_ref()
            .map(RepostRule::try_from)
            .transpose()
            .map_err(ClientError::by_internal)?;
        if let Some(rule) = &voice_role {
            info!("voice role enabled: role {} in guild {}", rule.role_id, rule.guild_id);
        }
        if let Some(rule) = &repost {
            info!("repost enabled: {} reaction(s) to channel {}", rule.threshold, rule.channel_id);
        }

        let inner = DiscordSmbClientInner {
            bot_user: RwLock::new(None),
            presence_started: AtomicBool::new(false),
            repost_lock: Mutex::new(()),
            table,
            status: config.status.clone(),
            voice_role,
            repost,
        };

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_VOICE_STATES
            | GatewayIntents::GUILD_MESSAGE_REACTIONS;
        let discord = SerenityClient::builder(token, intents)
            .event_handler(inner)
            .await
            .map_err(ClientError::by_external)?;
        Ok(discord)
    }

    async fn on_ready(&self, ctx: Context, ready: Ready) -> Result<(), ClientError> {
        info!("Discord client got ready: [{}] {}", ready.user.id, ready.user.name);

        let mut bot_user = self.bot_user.write().await;
        *bot_user = Some(ready.user.into());

        // 再接続でも ready は来るので一度だけ
        if !self.presence_started.swap(true, Ordering::SeqCst) {
            spawn(keep_presence(ctx, self.status.clone()));
        }
        Ok(())
    }

    async fn on_message(&self, ctx: Context, message: SerenityMessage) -> Result<(), ClientError> {
        // (自分含む) bot のメッセージを除外
        if message.author.bot {
            return Ok(());
        }

        let Some(reply) = decide_reply(&self.table, &message.content).await else {
            return Ok(());
        };
        debug!("[{}] {}: {}", message.id, message.author.id, message.content);

        let text = match reply {
            CommandReply::UserCount => {
                let member_counts: Vec<_> = ctx
                    .cache
                    .guilds()
                    .into_iter()
                    .filter_map(|id| ctx.cache.guild(id).map(|g| g.member_count))
                    .collect();
                user_count_reply(member_counts)
            }
            CommandReply::Text(text) => text,
        };

        message
            .channel_id
            .say(&ctx.http, truncate_for_discord(&text, MAX_MESSAGE_LENGTH))
            .map_err(ClientError::by_external)
            .await?;
        info!("replied to command in channel {}", message.channel_id);
        Ok(())
    }

    async fn on_voice_state_update(
        &self,
        ctx: Context,
        old: Option<VoiceState>,
        new: VoiceState,
    ) -> Result<(), ClientError> {
        let Some(rule) = &self.voice_role else {
            return Ok(());
        };
        if new.member.as_ref().is_some_and(|m| m.user.bot) {
            return Ok(());
        }

        let old_channel = old.and_then(|o| o.channel_id);
        let Some(change) = rule.decide(new.guild_id, old_channel, new.channel_id) else {
            return Ok(());
        };

        match change {
            RoleChange::Grant => {
                ctx.http
                    .add_member_role(rule.guild_id, new.user_id, rule.role_id, Some(VOICE_ROLE_REASON))
                    .map_err(ClientError::by_external)
                    .await?;
            }
            RoleChange::Revoke => {
                ctx.http
                    .remove_member_role(rule.guild_id, new.user_id, rule.role_id, Some(VOICE_ROLE_REASON))
                    .map_err(ClientError::by_external)
                    .await?;
            }
        }
        info!("voice role {change:?} for user {}", new.user_id);
        Ok(())
    }

    async fn on_reaction_add(&self, ctx: Context, reaction: Reaction) -> Result<(), ClientError> {
        let Some(rule) = &self.repost else {
            return Ok(());
        };
        if !rule.is_target(reaction.channel_id, &reaction.emoji) {
            return Ok(());
        }

        // 同じメッセージへの同時リアクションで二重に転載しない
        let _locked = self.repost_lock.lock().await;

        let message = ctx
            .http
            .get_message(reaction.channel_id, reaction.message_id)
            .map_err(ClientError::by_external)
            .await?;
        let reactors = message
            .reaction_users(&ctx.http, reaction.emoji.clone(), Some(REACTION_USERS_LIMIT), None::<UserId>)
            .map_err(ClientError::by_external)
            .await?;
        let human_reactors = reactors.iter().filter(|u| !u.bot).count();

        let bot_user_id = self.bot_user.read().await.as_ref().map(|u| u.id);
        let reacted_by_self = reactors.iter().any(|u| Some(u.id) == bot_user_id)
            || message
                .reactions
                .iter()
                .any(|r| r.me && rule.emoji.matches(&r.reaction_type));

        match rule.decide(reacted_by_self, human_reactors) {
            RepostDecision::Repost => (),
            decision => {
                debug!("message {} not reposted: {decision:?}", message.id);
                return Ok(());
            }
        }

        rule.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(build_repost_embed(&message)))
            .map_err(ClientError::by_external)
            .await?;

        // 印が付かないと次のリアクションで再び転載されてしまう
        let marker = rule.emoji.to_reaction_type();
        if let Err(err) = retry_once(|| message.react(&ctx.http, marker.clone())).await {
            error!(
                "message {} was reposted but could not be marked, it may be reposted again: {err}",
                message.id
            );
            return Err(ClientError::by_external(err));
        }
        info!("reposted message {} to channel {}", message.id, rule.channel_id);
        Ok(())
    }
}

/// ステータスは放っておくと消えるので定期的に設定し直す。
async fn keep_presence(ctx: Context, status: ConfigStatus) {
    info!("keeping presence \"{}\" every {}s", status.text, status.interval_seconds);
    loop {
        ctx.set_activity(Some(ActivityData::playing(&status.text)));
        sleep(status.interval()).await;
    }
}

/// 失敗したら 1 回だけやり直す。
async fn retry_once<T, E, F, Fut>(mut attempt: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match attempt().await {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!("retrying once after error: {err}");
            attempt().await
        }
    }
}

fn do_event<'t>(event_future: impl Future<Output = Result<(), ClientError>> + Send + 't) -> BoxFuture<'t, ()> {
    async {
        match event_future.await {
            Ok(()) => (),
            Err(err) => {
                error!("Discord event process reported error: {err}");
            }
        }
    }
    .boxed()
}
