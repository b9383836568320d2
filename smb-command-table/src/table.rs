use std::collections::{BTreeMap, HashMap};

use smb_core::{error::TableError, model::command_key::CommandKey};

/// コマンド名から応答文への不変なテーブル。
/// 更新は丸ごと差し替えで行い、部分的な変更はしない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    entries: HashMap<CommandKey, String>,
}

impl CommandTable {
    /// `{ "command": "response" }` 形式の JSON からテーブルを作る。
    /// 正規化後に衝突するキーは、元のキーの辞書順で後ろのものが勝つ。
    pub fn from_json(body: &str) -> Result<CommandTable, TableError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(body).map_err(TableError::by_parse)?;
        Ok(raw.into_iter().collect())
    }

    pub fn get(&self, key: &CommandKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<CommandKey>, V: Into<String>> FromIterator<(K, V)> for CommandTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> CommandTable {
        CommandTable {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_of_strings() {
        let table = CommandTable::from_json(r#"{"Ping": "pong", "!rules": "**Be nice.**"}"#).expect("valid table");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&CommandKey::new("ping")), Some("pong"));
        assert_eq!(table.get(&CommandKey::new("rules")), Some("**Be nice.**"));
    }

    #[test]
    fn rejects_other_shapes() {
        for body in ["not json", "[]", r#"{"ping": 1}"#, r#""ping""#, ""] {
            assert!(
                matches!(CommandTable::from_json(body), Err(TableError::Parse(_))),
                "{body:?}"
            );
        }
    }

    #[test]
    fn colliding_keys_resolve_deterministically() {
        let table = CommandTable::from_json(r#"{"ping": "lower", "PING": "upper"}"#).expect("valid table");
        assert_eq!(table.len(), 1);
        // "PING" < "ping" なので "ping" が後
        assert_eq!(table.get(&CommandKey::new("ping")), Some("lower"));
    }

    #[test]
    fn empty_object_is_empty_table() {
        let table = CommandTable::from_json("{}").expect("valid table");
        assert!(table.is_empty());
    }
}
