/// 通常メッセージの最大文字数。
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Embed の description の最大文字数。
pub const MAX_EMBED_DESCRIPTION_LENGTH: usize = 4096;

const OMITTED_MARKER: &str = "...(omitted)";

/// `max_length` 文字を超える場合は末尾を切り詰めて印を付ける。
pub fn truncate_for_discord(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let kept = max_length.saturating_sub(OMITTED_MARKER.chars().count());
    let mut truncated: String = text.chars().take(kept).collect();
    truncated.push_str(OMITTED_MARKER);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_short_text() {
        assert_eq!(truncate_for_discord("pong", 10), "pong");
        assert_eq!(truncate_for_discord("", 10), "");
    }

    #[test]
    fn truncates_by_chars() {
        let long = "あ".repeat(MAX_MESSAGE_LENGTH + 1);
        let truncated = truncate_for_discord(&long, MAX_MESSAGE_LENGTH);
        assert_eq!(truncated.chars().count(), MAX_MESSAGE_LENGTH);
        assert!(truncated.ends_with("...(omitted)"));
    }
}
