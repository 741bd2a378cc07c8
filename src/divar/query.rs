use serde::Serialize;

use crate::store::models::{Amenity, FilterSettings};

/// City and category a search is scoped to.
#[derive(Debug, Clone)]
pub struct MarketScope {
    pub city: String,
    pub category: String,
}

impl Default for MarketScope {
    fn default() -> Self {
        Self {
            city: "karaj".to_string(),
            category: "buy-apartment".to_string(),
        }
    }
}

/// Body of a Divar web-search request.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    pub json_schema: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "last-post-date")]
    pub last_post_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Only non-zero sides are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl Bounds {
    /// `None` when both sides are unbounded.
    pub fn from_pair(min: u64, max: u64) -> Option<Self> {
        let nz = |v: u64| (v != 0).then_some(v);
        match (nz(min), nz(max)) {
            (None, None) => None,
            (min, max) => Some(Self { min, max }),
        }
    }
}

/// Translate the user's filters into Divar's search shape.
///
/// Unset bounds, false amenities and an empty text query are omitted
/// entirely rather than sent as zero/false/"".
pub fn build_query(settings: &FilterSettings, scope: &MarketScope) -> SearchQuery {
    use serde_json::{json, Map};

    let mut schema = Map::new();
    schema.insert("category".into(), json!({ "value": scope.category }));
    schema.insert("cities".into(), json!([scope.city]));

    if let Some(price) = Bounds::from_pair(settings.min_price, settings.max_price) {
        schema.insert("price".into(), json!(price));
    }
    if let Some(size) = Bounds::from_pair(settings.min_area, settings.max_area) {
        schema.insert("size".into(), json!(size));
    }
    for amenity in Amenity::ALL {
        if settings.amenity(amenity) {
            schema.insert(amenity.schema_key().into(), json!({ "value": true }));
        }
    }

    let text = settings.query.trim();
    SearchQuery {
        json_schema: schema,
        last_post_date: 0,
        query: (!text.is_empty()).then(|| text.to_string()),
    }
}
