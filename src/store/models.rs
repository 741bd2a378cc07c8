use serde::{Deserialize, Serialize};

use crate::error::ScoutError;

/// The user's search criteria. A zero bound means "no constraint on that side".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub min_price: u64,
    pub max_price: u64,
    pub min_area: u64,
    pub max_area: u64,
    pub has_parking: bool,
    pub has_elevator: bool,
    pub has_warehouse: bool,
    pub query: String,
}

/// Listing amenities the user can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Amenity {
    Parking,
    Elevator,
    Warehouse,
}

impl Amenity {
    pub const ALL: [Amenity; 3] = [Amenity::Parking, Amenity::Elevator, Amenity::Warehouse];

    /// Short name used in callback data and commands.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Parking => "parking",
            Self::Elevator => "elevator",
            Self::Warehouse => "warehouse",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.slug() == s)
    }

    /// Key in Divar's search `json_schema`.
    pub fn schema_key(self) -> &'static str {
        match self {
            Self::Parking => "has-parking",
            Self::Elevator => "has-elevator",
            Self::Warehouse => "has-warehouse",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Parking => "🚗 Parking",
            Self::Elevator => "🛗 Elevator",
            Self::Warehouse => "📦 Storage room",
        }
    }
}

/// A single editable scalar in [`FilterSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    MinPrice,
    MaxPrice,
    MinArea,
    MaxArea,
    Query,
}

/// A min/max pair entered together ("3000000000 7000000000").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    Price,
    Area,
}

impl RangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Area => "area",
        }
    }
}

impl FilterSettings {
    pub fn amenity(&self, amenity: Amenity) -> bool {
        match amenity {
            Amenity::Parking => self.has_parking,
            Amenity::Elevator => self.has_elevator,
            Amenity::Warehouse => self.has_warehouse,
        }
    }

    /// Flip an amenity flag and return its new value.
    pub fn toggle(&mut self, amenity: Amenity) -> bool {
        let flag = match amenity {
            Amenity::Parking => &mut self.has_parking,
            Amenity::Elevator => &mut self.has_elevator,
            Amenity::Warehouse => &mut self.has_warehouse,
        };
        *flag = !*flag;
        *flag
    }

    /// Set one field from raw user text. Numeric fields must parse as
    /// non-negative integers; on failure `self` is left untouched.
    pub fn set(&mut self, field: Field, raw: &str) -> Result<(), ScoutError> {
        match field {
            Field::MinPrice => self.min_price = parse_amount(raw)?,
            Field::MaxPrice => self.max_price = parse_amount(raw)?,
            Field::MinArea => self.min_area = parse_amount(raw)?,
            Field::MaxArea => self.max_area = parse_amount(raw)?,
            Field::Query => {
                let text = raw.trim();
                self.query = if text == "-" { String::new() } else { text.to_string() };
            }
        }
        Ok(())
    }

    /// Set both sides of a range from `"<min> <max>"`.
    pub fn set_range(&mut self, kind: RangeKind, raw: &str) -> Result<(), ScoutError> {
        let parts: Vec<&str> = raw.split_whitespace().collect();
        let [min, max] = parts.as_slice() else {
            return Err(ScoutError::InvalidInput(format!(
                "expected two numbers for {}, got '{}'",
                kind.label(),
                raw.trim()
            )));
        };
        let (min, max) = (parse_amount(min)?, parse_amount(max)?);
        match kind {
            RangeKind::Price => (self.min_price, self.max_price) = (min, max),
            RangeKind::Area => (self.min_area, self.max_area) = (min, max),
        }
        Ok(())
    }

    /// Multi-line summary for the settings menu and `/status`.
    pub fn summary(&self) -> String {
        let mut text = format!(
            "💰 Price: {} - {}\n📐 Area: {} - {}\n",
            bound(self.min_price),
            bound(self.max_price),
            bound(self.min_area),
            bound(self.max_area),
        );
        for amenity in Amenity::ALL {
            let mark = if self.amenity(amenity) { "✅" } else { "❌" };
            text.push_str(&format!("{}: {}\n", amenity.display_name(), mark));
        }
        let query = if self.query.is_empty() { "-" } else { &self.query };
        text.push_str(&format!("🔎 Search: {}", query));
        text
    }
}

fn bound(v: u64) -> String {
    if v == 0 {
        "any".to_string()
    } else {
        v.to_string()
    }
}

/// Parse a non-negative integer typed by a user. Accepts `,`/`_`/`٬`
/// grouping and Persian or Arabic-Indic digits.
pub fn parse_amount(raw: &str) -> Result<u64, ScoutError> {
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | '٬'))
        .map(|c| match c {
            '۰'..='۹' => char::from(b'0' + (c as u32 - '۰' as u32) as u8),
            '٠'..='٩' => char::from(b'0' + (c as u32 - '٠' as u32) as u8),
            _ => c,
        })
        .collect();

    normalized
        .parse::<u64>()
        .map_err(|_| ScoutError::InvalidInput(format!("'{}' is not a whole number", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unfiltered() {
        let s = FilterSettings::default();
        assert_eq!(s.min_price, 0);
        assert_eq!(s.max_area, 0);
        assert!(Amenity::ALL.iter().all(|a| !s.amenity(*a)));
        assert!(s.query.is_empty());
    }

    #[test]
    fn test_partial_json_falls_back_per_field() {
        let s: FilterSettings =
            serde_json::from_str(r#"{"min_price": 2000000000, "has_elevator": true}"#).unwrap();
        assert_eq!(s.min_price, 2_000_000_000);
        assert!(s.has_elevator);
        assert_eq!(s.max_price, 0);
        assert!(!s.has_parking);
    }

    #[test]
    fn test_set_rejects_non_numeric_and_keeps_value() {
        let mut s = FilterSettings {
            min_price: 42,
            ..Default::default()
        };
        let err = s.set(Field::MinPrice, "cheap").unwrap_err();
        assert!(matches!(err, ScoutError::InvalidInput(_)));
        assert_eq!(s.min_price, 42);

        assert!(s.set(Field::MaxArea, "-5").is_err());
        assert_eq!(s.max_area, 0);
    }

    #[test]
    fn test_set_range_requires_two_numbers() {
        let mut s = FilterSettings::default();
        s.set_range(RangeKind::Price, "3000000000 7000000000").unwrap();
        assert_eq!((s.min_price, s.max_price), (3_000_000_000, 7_000_000_000));

        assert!(s.set_range(RangeKind::Area, "80").is_err());
        assert!(s.set_range(RangeKind::Area, "80 big").is_err());
        assert_eq!((s.min_area, s.max_area), (0, 0));

        // min > max is accepted as-is
        s.set_range(RangeKind::Area, "140 80").unwrap();
        assert_eq!((s.min_area, s.max_area), (140, 80));
    }

    #[test]
    fn test_parse_amount_handles_grouping_and_persian_digits() {
        assert_eq!(parse_amount("5,000,000,000").unwrap(), 5_000_000_000);
        assert_eq!(parse_amount("۱۲۰").unwrap(), 120);
        assert_eq!(parse_amount("٩٠").unwrap(), 90);
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_toggle_and_query_clear() {
        let mut s = FilterSettings::default();
        assert!(s.toggle(Amenity::Warehouse));
        assert!(s.has_warehouse);
        assert!(!s.toggle(Amenity::Warehouse));

        s.set(Field::Query, "  near metro ").unwrap();
        assert_eq!(s.query, "near metro");
        s.set(Field::Query, "-").unwrap();
        assert!(s.query.is_empty());
    }

    #[test]
    fn test_amenity_slug_roundtrip() {
        for a in Amenity::ALL {
            assert_eq!(Amenity::from_slug(a.slug()), Some(a));
        }
        assert_eq!(Amenity::from_slug("pool"), None);
    }
}
