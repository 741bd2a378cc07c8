use std::collections::HashMap;

use teloxide::types::ChatId;
use tokio::sync::Mutex;

use crate::error::ScoutError;
use crate::store::models::{Field, FilterSettings, RangeKind};

/// Which value a chat is expected to type next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardState {
    #[default]
    Idle,
    AwaitingPrice,
    AwaitingArea,
    AwaitingQuery,
}

impl WizardState {
    pub fn prompt(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::AwaitingPrice => Some(
                "💰 Send the minimum and maximum price (0 = any):\nExample: 3000000000 7000000000",
            ),
            Self::AwaitingArea => {
                Some("📐 Send the minimum and maximum area in m² (0 = any):\nExample: 80 140")
            }
            Self::AwaitingQuery => Some("🔎 Send the search text (or - to clear it):"),
        }
    }

    /// Apply the typed answer to `settings`.
    pub fn apply(self, settings: &mut FilterSettings, text: &str) -> Result<(), ScoutError> {
        match self {
            Self::Idle => Ok(()),
            Self::AwaitingPrice => settings.set_range(RangeKind::Price, text),
            Self::AwaitingArea => settings.set_range(RangeKind::Area, text),
            Self::AwaitingQuery => settings.set(Field::Query, text),
        }
    }
}

/// Per-chat wizard pointer. A chat with no entry is `Idle`.
#[derive(Debug, Default)]
pub struct Wizard {
    sessions: Mutex<HashMap<ChatId, WizardState>>,
}

impl Wizard {
    pub async fn begin(&self, chat: ChatId, step: WizardState) {
        let mut sessions = self.sessions.lock().await;
        if step == WizardState::Idle {
            sessions.remove(&chat);
        } else {
            sessions.insert(chat, step);
        }
    }

    pub async fn current(&self, chat: ChatId) -> WizardState {
        self.sessions
            .lock()
            .await
            .get(&chat)
            .copied()
            .unwrap_or_default()
    }

    /// Back to `Idle`. Returns the state that was pending.
    pub async fn finish(&self, chat: ChatId) -> WizardState {
        self.sessions
            .lock()
            .await
            .remove(&chat)
            .unwrap_or_default()
    }
}
