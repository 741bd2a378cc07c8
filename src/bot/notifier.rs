use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto, ParseMode};

use crate::error::ScoutError;

/// Outbound delivery used by the poll cycle. Captions are Telegram HTML.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, destination: ChatId, text: &str) -> Result<(), ScoutError>;

    /// Album with the caption attached to the first photo.
    async fn send_photo_group(
        &self,
        destination: ChatId,
        photos: &[String],
        caption: &str,
    ) -> Result<(), ScoutError>;

    async fn send_single_photo(
        &self,
        destination: ChatId,
        photo: &str,
        caption: &str,
    ) -> Result<(), ScoutError>;
}

pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn photo_file(url: &str) -> Result<InputFile, ScoutError> {
    let url = reqwest::Url::parse(url)
        .map_err(|e| ScoutError::Delivery(format!("bad photo url '{}': {}", url, e)))?;
    Ok(InputFile::url(url))
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, destination: ChatId, text: &str) -> Result<(), ScoutError> {
        self.bot
            .send_message(destination, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn send_photo_group(
        &self,
        destination: ChatId,
        photos: &[String],
        caption: &str,
    ) -> Result<(), ScoutError> {
        let mut media = Vec::with_capacity(photos.len());
        for (i, url) in photos.iter().enumerate() {
            let mut photo = InputMediaPhoto::new(photo_file(url)?);
            if i == 0 {
                photo.caption = Some(caption.to_string());
                photo.parse_mode = Some(ParseMode::Html);
            }
            media.push(InputMedia::Photo(photo));
        }

        self.bot.send_media_group(destination, media).await?;
        Ok(())
    }

    async fn send_single_photo(
        &self,
        destination: ChatId,
        photo: &str,
        caption: &str,
    ) -> Result<(), ScoutError> {
        self.bot
            .send_photo(destination, photo_file(photo)?)
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}
