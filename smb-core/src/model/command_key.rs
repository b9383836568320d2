use std::{borrow::Borrow, fmt::Display};

/// コマンドの接頭辞。
pub const COMMAND_PREFIX: char = '!';

/// 正規化済みのコマンド名。
/// 先頭の `!` と空白をすべて外し、末尾の空白を除去して小文字化したもの。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandKey(String);

impl CommandKey {
    pub fn new(raw: &str) -> CommandKey {
        let unprefixed = raw.trim_start_matches(|c: char| c == COMMAND_PREFIX || c.is_whitespace());
        CommandKey(unprefixed.trim_end().to_lowercase())
    }

    /// メッセージ本文からコマンドを取り出す。`!` で始まらないものは `None`。
    /// 最初の単語ではなく本文全体をキーにする。
    pub fn from_message(content: &str) -> Option<CommandKey> {
        let trimmed = content.trim();
        if !trimmed.starts_with(COMMAND_PREFIX) {
            return None;
        }
        Some(CommandKey::new(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CommandKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CommandKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommandKey {
    fn from(value: &str) -> CommandKey {
        CommandKey::new(value)
    }
}

impl From<String> for CommandKey {
    fn from(value: String) -> CommandKey {
        CommandKey::new(&value)
    }
}
