use std::sync::Arc;
use teloxide::macros::BotCommands;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands as _;

use crate::bot::menu::{menu_keyboard, menu_text};
use crate::bot::notifier::TelegramNotifier;
use crate::bot::wizard::WizardState;
use crate::bot::{AppState, HandlerResult};
use crate::poller::{CycleRun, Trigger};
use crate::store::models::{Amenity, Field, FilterSettings, RangeKind};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum BotCommand {
    #[command(description = "Start / show the filter menu")]
    Start,
    #[command(description = "Open the filter menu")]
    Settings,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Set price range: /price <min> <max> (0 = any)")]
    Price(String),
    #[command(description = "Set area range in m²: /area <min> <max> (0 = any)")]
    Area(String),
    #[command(description = "Set only the minimum price: /minprice <amount> (0 = any)")]
    MinPrice(String),
    #[command(description = "Set only the maximum price: /maxprice <amount> (0 = any)")]
    MaxPrice(String),
    #[command(description = "Set only the minimum area: /minarea <m²> (0 = any)")]
    MinArea(String),
    #[command(description = "Set only the maximum area: /maxarea <m²> (0 = any)")]
    MaxArea(String),
    #[command(description = "Set search text: /query <text> (- clears)")]
    Query(String),
    #[command(description = "Toggle the parking requirement")]
    Parking,
    #[command(description = "Toggle the elevator requirement")]
    Elevator,
    #[command(description = "Toggle the storage room requirement")]
    Warehouse,
    #[command(description = "Check Divar for new listings now")]
    Update,
    #[command(description = "Show filters and last check")]
    Status,
    #[command(description = "Reset all filters")]
    Reset,
    #[command(description = "Cancel the pending input")]
    Cancel,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    state: Arc<AppState>,
) -> HandlerResult {
    run_command(&bot, msg.chat.id, cmd, &state).await
}

/// Any command abandons a pending wizard step before it runs.
pub async fn run_command(
    bot: &Bot,
    chat: ChatId,
    cmd: BotCommand,
    state: &AppState,
) -> HandlerResult {
    let pending = state.wizard.finish(chat).await;

    match cmd {
        BotCommand::Start | BotCommand::Settings => {
            send_menu(bot, chat, &state.settings.snapshot().await).await?;
        }

        BotCommand::Help => {
            bot.send_message(chat, BotCommand::descriptions().to_string())
                .await?;
        }

        BotCommand::Price(args) => set_range(bot, chat, state, RangeKind::Price, &args).await?,
        BotCommand::Area(args) => set_range(bot, chat, state, RangeKind::Area, &args).await?,

        BotCommand::MinPrice(args) => set_field(bot, chat, state, Field::MinPrice, &args).await?,
        BotCommand::MaxPrice(args) => set_field(bot, chat, state, Field::MaxPrice, &args).await?,
        BotCommand::MinArea(args) => set_field(bot, chat, state, Field::MinArea, &args).await?,
        BotCommand::MaxArea(args) => set_field(bot, chat, state, Field::MaxArea, &args).await?,

        BotCommand::Query(args) => {
            if args.trim().is_empty() {
                start_step(bot, chat, state, WizardState::AwaitingQuery).await?;
            } else {
                set_field(bot, chat, state, Field::Query, &args).await?;
            }
        }

        BotCommand::Parking => toggle(bot, chat, state, Amenity::Parking).await?,
        BotCommand::Elevator => toggle(bot, chat, state, Amenity::Elevator).await?,
        BotCommand::Warehouse => toggle(bot, chat, state, Amenity::Warehouse).await?,

        BotCommand::Update => manual_update(bot, chat, state).await?,

        BotCommand::Status => {
            bot.send_message(chat, status_text(state).await).await?;
        }

        BotCommand::Reset => {
            let settings = state.settings.reset().await;
            tracing::info!("Filters reset from chat {}", chat.0);
            send_menu(bot, chat, &settings).await?;
        }

        BotCommand::Cancel => {
            let text = if pending == WizardState::Idle {
                "Nothing to cancel."
            } else {
                "Cancelled."
            };
            bot.send_message(chat, text).await?;
        }
    }

    Ok(())
}

pub async fn send_menu(bot: &Bot, chat: ChatId, settings: &FilterSettings) -> HandlerResult {
    bot.send_message(chat, menu_text(settings))
        .reply_markup(menu_keyboard(settings))
        .await?;
    Ok(())
}

/// Put the chat into `step` and ask for the value.
pub async fn start_step(
    bot: &Bot,
    chat: ChatId,
    state: &AppState,
    step: WizardState,
) -> HandlerResult {
    state.wizard.begin(chat, step).await;
    if let Some(prompt) = step.prompt() {
        bot.send_message(chat, prompt).await?;
    }
    Ok(())
}

async fn set_range(
    bot: &Bot,
    chat: ChatId,
    state: &AppState,
    kind: RangeKind,
    args: &str,
) -> HandlerResult {
    if args.trim().is_empty() {
        let step = match kind {
            RangeKind::Price => WizardState::AwaitingPrice,
            RangeKind::Area => WizardState::AwaitingArea,
        };
        return start_step(bot, chat, state, step).await;
    }

    match state.settings.update(|s| s.set_range(kind, args)).await {
        Ok(settings) => send_menu(bot, chat, &settings).await?,
        Err(e) => {
            bot.send_message(chat, format!("❌ {}", e)).await?;
        }
    }
    Ok(())
}

async fn set_field(
    bot: &Bot,
    chat: ChatId,
    state: &AppState,
    field: Field,
    args: &str,
) -> HandlerResult {
    match state.settings.update(|s| s.set(field, args)).await {
        Ok(settings) => send_menu(bot, chat, &settings).await?,
        Err(e) => {
            bot.send_message(chat, format!("❌ {}", e)).await?;
        }
    }
    Ok(())
}

async fn toggle(bot: &Bot, chat: ChatId, state: &AppState, amenity: Amenity) -> HandlerResult {
    let settings = state
        .settings
        .update(|s| {
            s.toggle(amenity);
            Ok(())
        })
        .await?;
    send_menu(bot, chat, &settings).await
}

/// Run a cycle right now, delivering to the chat that asked.
pub async fn manual_update(bot: &Bot, chat: ChatId, state: &AppState) -> HandlerResult {
    bot.send_message(chat, "⏳ Checking Divar...").await?;

    let notifier = TelegramNotifier::new(bot.clone());
    let settings = state.settings.snapshot().await;
    let reply = match state
        .poller
        .run(&notifier, chat, &settings, Trigger::Manual)
        .await
    {
        CycleRun::Busy => "⏳ A check is already running, results will arrive shortly.".to_string(),
        CycleRun::Completed(r) if r.fetch_failed => {
            "⚠️ Couldn't reach Divar right now. Try again later.".to_string()
        }
        CycleRun::Completed(r) if r.delivered == 0 && r.failed == 0 => {
            "✅ Done. No new listings.".to_string()
        }
        CycleRun::Completed(r) if r.failed > 0 => format!(
            "✅ Done. {} new listing(s), {} could not be sent.",
            r.delivered, r.failed
        ),
        CycleRun::Completed(r) => format!("✅ Done. {} new listing(s).", r.delivered),
    };

    bot.send_message(chat, reply).await?;
    Ok(())
}

async fn status_text(state: &AppState) -> String {
    let settings = state.settings.snapshot().await;
    let mut text = format!("📊 Status\n\n{}\n\n", settings.summary());

    match state.config.chat_id {
        Some(id) => text.push_str(&format!(
            "⏰ Auto-check every {} min → chat {}\n",
            state.config.poll_interval.as_secs() / 60,
            id
        )),
        None => text.push_str("⏰ Auto-check disabled (CHAT_ID not set)\n"),
    }

    text.push_str(&format!(
        "👁 Remembered listings: {}/{}\n",
        state.poller.seen_len().await,
        state.config.seen_cap
    ));

    match state.poller.last_report().await {
        Some(r) => {
            let outcome = if r.fetch_failed {
                "search failed".to_string()
            } else {
                format!("{} new, {} failed", r.delivered, r.failed)
            };
            text.push_str(&format!(
                "🕒 Last check: {} ({}): {}",
                r.started_at.format("%Y-%m-%d %H:%M UTC"),
                r.trigger,
                outcome
            ));
        }
        None => text.push_str("🕒 Last check: never"),
    }

    text
}
