use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use teloxide::types::ChatId;
use teloxide::utils::html;

use crate::bot::notifier::Notifier;
use crate::divar::{build_query, ListingSource, ListingSummary, MarketScope};
use crate::error::ScoutError;
use crate::store::models::FilterSettings;
use crate::store::seen::SeenSet;

/// Telegram albums get unwieldy past a handful of photos.
pub const MAX_PHOTOS: usize = 4;

#[derive(Debug, Clone)]
pub struct CycleOptions {
    pub scope: MarketScope,
    /// Newest results considered per cycle.
    pub window: usize,
    /// Pause between consecutive photo lookups.
    pub enrich_delay: Duration,
    pub max_photos: usize,
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            scope: MarketScope::default(),
            window: 5,
            enrich_delay: Duration::from_millis(1500),
            max_photos: MAX_PHOTOS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Scheduled,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => f.write_str("scheduled"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

/// Where a tick currently is. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Fetching,
    FetchFailed,
    Filtering,
    Enriching,
    Notifying,
    Idle,
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub trigger: Trigger,
    /// Listings returned by the search.
    pub fetched: usize,
    /// Listings left after windowing and dedupe.
    pub fresh: usize,
    pub delivered: usize,
    pub failed: usize,
    pub fetch_failed: bool,
}

impl CycleReport {
    fn new(trigger: Trigger) -> Self {
        Self {
            started_at: Utc::now(),
            trigger,
            fetched: 0,
            fresh: 0,
            delivered: 0,
            failed: 0,
            fetch_failed: false,
        }
    }
}

/// A listing selected for delivery, with its photo gallery.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub listing: ListingSummary,
    pub photos: Vec<String>,
}

impl Candidate {
    pub fn caption(&self) -> String {
        let l = &self.listing;
        let title: String = l.title.chars().take(200).collect();
        let description: String = l.description.chars().take(300).collect();
        format!(
            "🏠 <b>{}</b>\n📍 {}\n💰 {}\n\n🔗 <a href='{}'>View on Divar</a>",
            html::escape(&title),
            html::escape(&l.district),
            html::escape(&description),
            l.url(),
        )
    }
}

/// One poll-filter-notify tick.
///
/// A failed search aborts the tick without touching `seen`. Each delivered
/// listing is recorded in `seen` right away; a listing whose delivery fails
/// stays unseen and is retried on a later tick.
pub async fn run_cycle(
    source: &dyn ListingSource,
    notifier: &dyn Notifier,
    destination: ChatId,
    settings: &FilterSettings,
    seen: &mut SeenSet,
    options: &CycleOptions,
    trigger: Trigger,
) -> CycleReport {
    let mut report = CycleReport::new(trigger);

    tracing::debug!(phase = ?CyclePhase::Fetching, %trigger, "cycle started");
    let query = build_query(settings, &options.scope);
    let listings = match source.search(&query).await {
        Ok(listings) => listings,
        Err(e) => {
            tracing::warn!(phase = ?CyclePhase::FetchFailed, %trigger, "Search failed, skipping tick: {}", e);
            report.fetch_failed = true;
            return report;
        }
    };
    report.fetched = listings.len();

    tracing::debug!(phase = ?CyclePhase::Filtering, fetched = report.fetched);
    let fresh = select_fresh(listings, seen, options.window);
    report.fresh = fresh.len();

    tracing::debug!(phase = ?CyclePhase::Enriching, fresh = report.fresh);
    let candidates = enrich(source, fresh, options).await;

    tracing::debug!(phase = ?CyclePhase::Notifying);
    // Window is newest first; deliver oldest first so the chat reads in order.
    for candidate in candidates.into_iter().rev() {
        let token = candidate.listing.token.clone();
        match deliver(notifier, destination, &candidate).await {
            Ok(()) => {
                seen.insert(token);
                report.delivered += 1;
            }
            Err(e) => {
                tracing::error!("Failed to deliver listing {}: {}", token, e);
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        phase = ?CyclePhase::Idle,
        %trigger,
        fetched = report.fetched,
        fresh = report.fresh,
        delivered = report.delivered,
        failed = report.failed,
        "cycle finished"
    );
    report
}

/// First `window` listings whose token is neither seen nor repeated.
fn select_fresh(listings: Vec<ListingSummary>, seen: &SeenSet, window: usize) -> Vec<ListingSummary> {
    let mut batch = HashSet::new();
    listings
        .into_iter()
        .take(window)
        .filter(|l| !seen.contains(&l.token) && batch.insert(l.token.clone()))
        .collect()
}

async fn enrich(
    source: &dyn ListingSource,
    listings: Vec<ListingSummary>,
    options: &CycleOptions,
) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(listings.len());
    for (i, listing) in listings.into_iter().enumerate() {
        if i > 0 && !options.enrich_delay.is_zero() {
            tokio::time::sleep(options.enrich_delay).await;
        }

        let mut photos = source.photos(&listing.token).await;
        if photos.is_empty() {
            photos.extend(listing.image_url.clone());
        }
        photos.truncate(options.max_photos);
        out.push(Candidate { listing, photos });
    }
    out
}

async fn deliver(
    notifier: &dyn Notifier,
    destination: ChatId,
    candidate: &Candidate,
) -> Result<(), ScoutError> {
    let caption = candidate.caption();
    match candidate.photos.as_slice() {
        [] => notifier.send_text(destination, &caption).await,
        [only] => notifier.send_single_photo(destination, only, &caption).await,
        many => notifier.send_photo_group(destination, many, &caption).await,
    }
}
