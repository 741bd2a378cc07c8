use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::store::models::{Amenity, FilterSettings};

/// Inline settings menu buttons, encoded into callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Price,
    Area,
    Query,
    Toggle(Amenity),
    Update,
    Reset,
}

impl MenuAction {
    pub fn data(self) -> String {
        match self {
            Self::Price => "menu:price".to_string(),
            Self::Area => "menu:area".to_string(),
            Self::Query => "menu:query".to_string(),
            Self::Update => "menu:update".to_string(),
            Self::Reset => "menu:reset".to_string(),
            Self::Toggle(a) => format!("toggle:{}", a.slug()),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        if let Some(slug) = data.strip_prefix("toggle:") {
            return Amenity::from_slug(slug).map(Self::Toggle);
        }
        match data.strip_prefix("menu:")? {
            "price" => Some(Self::Price),
            "area" => Some(Self::Area),
            "query" => Some(Self::Query),
            "update" => Some(Self::Update),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

pub fn menu_text(settings: &FilterSettings) -> String {
    format!("⚙️ Divar filter settings\n\n{}", settings.summary())
}

pub fn menu_keyboard(settings: &FilterSettings) -> InlineKeyboardMarkup {
    let button = |label: String, action: MenuAction| {
        vec![InlineKeyboardButton::callback(label, action.data())]
    };

    let mut rows = vec![
        button("💰 Price".to_string(), MenuAction::Price),
        button("📐 Area".to_string(), MenuAction::Area),
    ];
    for amenity in Amenity::ALL {
        let mark = if settings.amenity(amenity) { "✅" } else { "⬜" };
        rows.push(button(
            format!("{} {}", mark, amenity.display_name()),
            MenuAction::Toggle(amenity),
        ));
    }
    rows.push(button("🔎 Search text".to_string(), MenuAction::Query));
    rows.push(button("🔄 Check now".to_string(), MenuAction::Update));
    rows.push(button("♻️ Reset filters".to_string(), MenuAction::Reset));

    InlineKeyboardMarkup::new(rows)
}
