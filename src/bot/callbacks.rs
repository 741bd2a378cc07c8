use std::sync::Arc;
use teloxide::prelude::*;

use crate::bot::commands::{manual_update, send_menu, start_step};
use crate::bot::menu::{menu_keyboard, menu_text, MenuAction};
use crate::bot::wizard::WizardState;
use crate::bot::{AppState, HandlerResult};

pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<AppState>) -> HandlerResult {
    let Some(action) = q.data.as_deref().and_then(MenuAction::parse) else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };

    let Some(menu_msg) = q.message.as_ref() else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };
    let chat = menu_msg.chat().id;

    // A button press abandons any half-finished input.
    state.wizard.finish(chat).await;

    match action {
        MenuAction::Toggle(amenity) => {
            let settings = state
                .settings
                .update(|s| {
                    s.toggle(amenity);
                    Ok(())
                })
                .await?;
            bot.answer_callback_query(&q.id).await?;

            // Re-render the menu in place.
            if let Err(e) = bot
                .edit_message_text(chat, menu_msg.id(), menu_text(&settings))
                .reply_markup(menu_keyboard(&settings))
                .await
            {
                tracing::warn!("Could not edit menu in chat {}: {}", chat.0, e);
                send_menu(&bot, chat, &settings).await?;
            }
        }

        MenuAction::Price => {
            bot.answer_callback_query(&q.id).await?;
            start_step(&bot, chat, &state, WizardState::AwaitingPrice).await?;
        }

        MenuAction::Area => {
            bot.answer_callback_query(&q.id).await?;
            start_step(&bot, chat, &state, WizardState::AwaitingArea).await?;
        }

        MenuAction::Query => {
            bot.answer_callback_query(&q.id).await?;
            start_step(&bot, chat, &state, WizardState::AwaitingQuery).await?;
        }

        MenuAction::Update => {
            bot.answer_callback_query(&q.id).text("Checking...").await?;
            manual_update(&bot, chat, &state).await?;
        }

        MenuAction::Reset => {
            let settings = state.settings.reset().await;
            bot.answer_callback_query(&q.id).text("Filters reset").await?;
            if let Err(e) = bot
                .edit_message_text(chat, menu_msg.id(), menu_text(&settings))
                .reply_markup(menu_keyboard(&settings))
                .await
            {
                tracing::debug!("Menu unchanged after reset in chat {}: {}", chat.0, e);
            }
        }
    }

    Ok(())
}
