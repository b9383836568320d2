use crate::text::{MAX_EMBED_DESCRIPTION_LENGTH, truncate_for_discord};

use serenity::all::{Attachment, CreateEmbed, CreateEmbedAuthor, Message};

/// 転載用の Embed を作る。
pub fn build_repost_embed(message: &Message) -> CreateEmbed {
    let author = CreateEmbedAuthor::new(&message.author.name).icon_url(message.author.face());
    let mut embed = CreateEmbed::new()
        .author(author)
        .field("Source", format!("[Jump to message]({})", message.link()), false)
        .timestamp(message.timestamp);

    // 空の description は受け付けられない
    if !message.content.is_empty() {
        embed = embed.description(truncate_for_discord(&message.content, MAX_EMBED_DESCRIPTION_LENGTH));
    }
    if let Some(image) = message.attachments.iter().find(|a| is_image(a)) {
        embed = embed.image(&image.url);
    }
    embed
}

fn is_image(attachment: &Attachment) -> bool {
    match attachment.content_type.as_deref() {
        Some(content_type) => content_type.starts_with("image/"),
        None => attachment.height.is_some(),
    }
}
