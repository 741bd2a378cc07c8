use serde::Deserialize;

/// One row of a Divar search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSummary {
    pub token: String,
    pub title: String,
    pub district: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl ListingSummary {
    pub fn url(&self) -> String {
        format!("https://divar.ir/v/a/{}", self.token)
    }
}

// ── Search response ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchResponse {
    web_widgets: WebWidgets,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebWidgets {
    post_list: Vec<PostRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostRow {
    data: PostRowData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostRowData {
    token: Option<String>,
    title: String,
    district: String,
    middle_description_text: String,
    image_url: Option<String>,
}

impl SearchResponse {
    /// Rows without a token cannot be deduplicated or linked and are dropped.
    pub(crate) fn into_listings(self) -> Vec<ListingSummary> {
        self.web_widgets
            .post_list
            .into_iter()
            .filter_map(|row| {
                let d = row.data;
                let token = d.token.filter(|t| !t.is_empty())?;
                Some(ListingSummary {
                    token,
                    title: d.title,
                    district: d.district,
                    description: d.middle_description_text,
                    image_url: d.image_url.filter(|u| !u.is_empty()),
                })
            })
            .collect()
    }
}

// ── Post detail response ───────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PostResponse {
    widgets: PostWidgets,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostWidgets {
    list: Vec<PostWidget>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostWidget {
    widget_type: String,
    data: serde_json::Value,
}

impl PostResponse {
    /// Image URLs from every `IMAGE_CAROUSEL` widget, in page order.
    pub(crate) fn into_photos(self) -> Vec<String> {
        self.widgets
            .list
            .into_iter()
            .filter(|w| w.widget_type == "IMAGE_CAROUSEL")
            .flat_map(|w| {
                w.data
                    .get("items")
                    .and_then(|v| v.as_array())
                    .cloned()
                    .unwrap_or_default()
            })
            .filter_map(|item| item.get("image_url")?.as_str().map(str::to_string))
            .collect()
    }
}
