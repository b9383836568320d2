use serde::Deserialize;

/// [repost]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigRepost {
    /// Unicode 絵文字、またはカスタム絵文字の `name:id`。
    pub emoji: String,
    pub threshold: usize,
    pub channel_id: u64,
}
