use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::models::{ListingSummary, PostResponse, SearchResponse};
use super::query::{MarketScope, SearchQuery};
use super::ListingSource;
use crate::error::ScoutError;

const API_BASE: &str = "https://api.divar.ir/v8";

pub struct DivarClient {
    client: Client,
    scope: MarketScope,
    base_url: String,
}

impl DivarClient {
    pub fn new(scope: MarketScope, timeout: Duration) -> Result<Self, ScoutError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0")
            .build()?;
        Ok(Self {
            client,
            scope,
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_url(&self) -> String {
        format!(
            "{}/web-search/{}/{}",
            self.base_url, self.scope.city, self.scope.category
        )
    }

    async fn fetch_photos(&self, token: &str) -> Result<Vec<String>, ScoutError> {
        let resp = self
            .client
            .get(format!("{}/posts/{}", self.base_url, token))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ScoutError::Marketplace(format!(
                "post {} returned {}",
                token,
                resp.status()
            )));
        }

        let post: PostResponse = resp.json().await?;
        Ok(post.into_photos())
    }
}

#[async_trait]
impl ListingSource for DivarClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ListingSummary>, ScoutError> {
        let resp = self
            .client
            .post(self.search_url())
            .json(query)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(ScoutError::Marketplace(format!(
                "search returned {}: {}",
                status, preview
            )));
        }

        let result: SearchResponse = resp.json().await?;
        Ok(result.into_listings())
    }

    async fn photos(&self, token: &str) -> Vec<String> {
        match self.fetch_photos(token).await {
            Ok(photos) => photos,
            Err(e) => {
                tracing::warn!("Photo lookup for {} failed: {}", token, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    fn scope(category: &str) -> MarketScope {
        MarketScope {
            city: "karaj".into(),
            category: category.into(),
        }
    }

    fn query(text: Option<&str>) -> SearchQuery {
        SearchQuery {
            json_schema: serde_json::Map::new(),
            last_post_date: 0,
            query: text.map(str::to_string),
        }
    }

    async fn search_ok(Json(body): Json<Value>) -> Json<Value> {
        let title = body["query"].as_str().unwrap_or("untitled").to_string();
        Json(json!({
            "web_widgets": { "post_list": [
                { "data": { "token": "new1", "title": title, "district": "عظیمیه" } },
                { "data": { "token": "old1", "title": "older" } }
            ] }
        }))
    }

    async fn search_down() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "upstream down")
    }

    async fn post_detail(Path(token): Path<String>) -> Result<Json<Value>, StatusCode> {
        if token == "locked" {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(Json(json!({
            "widgets": { "list": [
                { "widget_type": "IMAGE_CAROUSEL", "data": { "items": [
                    { "image_url": format!("https://img/{token}/1.jpg") },
                    { "image_url": format!("https://img/{token}/2.jpg") }
                ] } }
            ] }
        })))
    }

    /// Local stand-in for the Divar API; returns its base URL.
    async fn fake_divar() -> String {
        let app = Router::new()
            .route("/web-search/karaj/buy-apartment", post(search_ok))
            .route("/web-search/karaj/broken", post(search_down))
            .route("/posts/:token", get(post_detail));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}")
    }

    fn client(base: &str, category: &str) -> DivarClient {
        DivarClient::new(scope(category), Duration::from_secs(5))
            .unwrap()
            .with_base_url(base)
    }

    #[test]
    fn test_search_url_uses_scope() {
        let client = DivarClient::new(
            MarketScope {
                city: "tehran".into(),
                category: "rent-apartment".into(),
            },
            Duration::from_secs(15),
        )
        .unwrap();
        assert_eq!(
            client.search_url(),
            "https://api.divar.ir/v8/web-search/tehran/rent-apartment"
        );
    }

    #[tokio::test]
    async fn test_search_parses_listings_in_order() {
        let base = fake_divar().await;
        let listings = client(&base, "buy-apartment")
            .search(&query(Some("duplex")))
            .await
            .unwrap();

        let tokens: Vec<&str> = listings.iter().map(|l| l.token.as_str()).collect();
        assert_eq!(tokens, vec!["new1", "old1"]);
        assert_eq!(listings[0].title, "duplex");
        assert_eq!(listings[0].district, "عظیمیه");
    }

    #[tokio::test]
    async fn test_search_server_error_is_marketplace_error() {
        let base = fake_divar().await;
        let err = client(&base, "broken").search(&query(None)).await.unwrap_err();
        assert!(
            matches!(err, ScoutError::Marketplace(ref m) if m.contains("500") && m.contains("upstream down"))
        );
    }

    #[tokio::test]
    async fn test_photos_returns_carousel_urls() {
        let base = fake_divar().await;
        let photos = client(&base, "buy-apartment").photos("abc").await;
        assert_eq!(photos, vec!["https://img/abc/1.jpg", "https://img/abc/2.jpg"]);
    }

    #[tokio::test]
    async fn test_forbidden_post_yields_no_photos() {
        let base = fake_divar().await;
        let photos = client(&base, "buy-apartment").photos("locked").await;
        assert!(photos.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        let err = client("http://127.0.0.1:1", "buy-apartment")
            .search(&query(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::Http(_)));
    }
}
