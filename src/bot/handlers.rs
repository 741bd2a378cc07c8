use std::sync::Arc;
use teloxide::prelude::*;

use crate::bot::commands::send_menu;
use crate::bot::wizard::WizardState;
use crate::bot::{AppState, HandlerResult};

/// Plain text: the answer to whatever the wizard asked for last.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat = msg.chat.id;

    let step = state.wizard.current(chat).await;
    if step == WizardState::Idle || text.starts_with('/') {
        return Ok(());
    }

    match state.settings.update(|s| step.apply(s, text)).await {
        Ok(settings) => {
            state.wizard.finish(chat).await;
            tracing::info!("Chat {} updated filters via {:?}", chat.0, step);
            send_menu(&bot, chat, &settings).await?;
        }
        Err(e) => {
            // Stay in the same step so the user can simply retry.
            bot.send_message(chat, format!("❌ {}\nTry again or /cancel.", e))
                .await?;
        }
    }

    Ok(())
}
