use serde::Deserialize;

/// [voice_role]
/// ボイスチャンネルにいる間だけ付与するロール。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConfigVoiceRole {
    pub guild_id: u64,
    pub role_id: u64,
}
