use crate::DiscordClientError;

use serenity::all::{ChannelId, EmojiId, GuildId, ReactionType, RoleId};
use smb_command_table::CommandTableCache;
use smb_common::config::{repost::ConfigRepost, voice_role::ConfigVoiceRole};
use smb_core::model::command_key::CommandKey;

/// 組込みのユーザー数コマンド。
const USERS_COMMAND: &str = "users";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    UserCount,
    Text(String),
}

/// メッセージ本文に対する返信を決める。コマンドでなければ `None`。
pub async fn decide_reply(table: &CommandTableCache, content: &str) -> Option<CommandReply> {
    let key = CommandKey::from_message(content)?;
    if key.as_str() == USERS_COMMAND {
        return Some(CommandReply::UserCount);
    }

    // 空文字列は送信できない
    let response = table.lookup(key).await?;
    if response.is_empty() {
        return None;
    }
    Some(CommandReply::Text(response))
}

/// 各サーバーのメンバー数の単純な合計。重複は除かない。
pub fn user_count_reply(member_counts: impl IntoIterator<Item = u64>) -> String {
    let total: u64 = member_counts.into_iter().sum();
    format!("The bot has {total} users.\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Grant,
    Revoke,
}

/// ボイスチャンネルに入ったらロールを付け、抜けたら外す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceRoleRule {
    pub guild_id: GuildId,
    pub role_id: RoleId,
}

impl VoiceRoleRule {
    pub fn decide(
        &self,
        guild_id: Option<GuildId>,
        old_channel: Option<ChannelId>,
        new_channel: Option<ChannelId>,
    ) -> Option<RoleChange> {
        if guild_id != Some(self.guild_id) {
            return None;
        }
        match (old_channel, new_channel) {
            (None, Some(_)) => Some(RoleChange::Grant),
            (Some(_), None) => Some(RoleChange::Revoke),
            // 移動やミュートの切り替え
            (Some(_), Some(_)) | (None, None) => None,
        }
    }
}

impl TryFrom<&ConfigVoiceRole> for VoiceRoleRule {
    type Error = DiscordClientError;

    fn try_from(value: &ConfigVoiceRole) -> Result<VoiceRoleRule, DiscordClientError> {
        Ok(VoiceRoleRule {
            guild_id: GuildId::new(non_zero(value.guild_id, "voice_role.guild_id")?),
            role_id: RoleId::new(non_zero(value.role_id, "voice_role.role_id")?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepostEmoji {
    Unicode(String),
    Custom { id: EmojiId, name: String },
}

impl RepostEmoji {
    /// `name:id` ならカスタム絵文字、それ以外は Unicode 絵文字として扱う。
    pub fn parse(emoji: &str) -> RepostEmoji {
        match emoji.rsplit_once(':') {
            Some((name, id)) => match id.parse::<u64>() {
                Ok(id) if id != 0 => RepostEmoji::Custom {
                    id: EmojiId::new(id),
                    name: name.trim_start_matches(':').to_string(),
                },
                _ => RepostEmoji::Unicode(emoji.to_string()),
            },
            None => RepostEmoji::Unicode(emoji.to_string()),
        }
    }

    pub fn matches(&self, reaction_type: &ReactionType) -> bool {
        match (self, reaction_type) {
            (RepostEmoji::Unicode(expected), ReactionType::Unicode(actual)) => expected == actual,
            (RepostEmoji::Custom { id: expected, .. }, ReactionType::Custom { id: actual, .. }) => expected == actual,
            _ => false,
        }
    }

    pub fn to_reaction_type(&self) -> ReactionType {
        match self {
            RepostEmoji::Unicode(emoji) => ReactionType::Unicode(emoji.clone()),
            RepostEmoji::Custom { id, name } => ReactionType::Custom {
                animated: false,
                id: *id,
                name: Some(name.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepostDecision {
    Repost,
    AlreadyReposted,
    BelowThreshold { count: usize },
}

/// 一定数のリアクションが付いたメッセージを別チャンネルに転載する。
/// 転載済みの印として bot 自身もリアクションを付ける。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepostRule {
    pub emoji: RepostEmoji,
    pub threshold: usize,
    pub channel_id: ChannelId,
}

impl RepostRule {
    /// 処理対象のリアクションか。転載先チャンネル自体でのリアクションは無視する。
    pub fn is_target(&self, channel_id: ChannelId, reaction_type: &ReactionType) -> bool {
        channel_id != self.channel_id && self.emoji.matches(reaction_type)
    }

    /// `reacted_by_self` は bot 自身が同じ絵文字を付けているか、
    /// `human_reactors` は bot 以外でリアクションしたユーザーの数。
    pub fn decide(&self, reacted_by_self: bool, human_reactors: usize) -> RepostDecision {
        if reacted_by_self {
            RepostDecision::AlreadyReposted
        } else if human_reactors >= self.threshold.max(1) {
            RepostDecision::Repost
        } else {
            RepostDecision::BelowThreshold { count: human_reactors }
        }
    }
}

impl TryFrom<&ConfigRepost> for RepostRule {
    type Error = DiscordClientError;

    fn try_from(value: &ConfigRepost) -> Result<RepostRule, DiscordClientError> {
        Ok(RepostRule {
            emoji: RepostEmoji::parse(&value.emoji),
            threshold: value.threshold,
            channel_id: ChannelId::new(non_zero(value.channel_id, "repost.channel_id")?),
        })
    }
}

/// Discord の ID は 0 にならない。
fn non_zero(id: u64, name: &'static str) -> Result<u64, DiscordClientError> {
    if id == 0 {
        return Err(DiscordClientError::ZeroId(name));
    }
    Ok(id)
}
