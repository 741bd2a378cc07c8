pub mod models;
pub mod seen;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::ScoutError;
use models::FilterSettings;
use seen::SeenSet;

/// Owns the current [`FilterSettings`] and keeps the JSON file in sync.
///
/// Single record shared by every chat; concurrent edits are last-write-wins.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<FilterSettings>,
}

impl SettingsStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = load_settings(&path).await;
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub async fn snapshot(&self) -> FilterSettings {
        self.current.read().await.clone()
    }

    /// Apply `edit` to a copy of the settings. Only if it succeeds is the copy
    /// swapped in and written to disk. A failed write is logged; the in-memory
    /// value stays authoritative.
    pub async fn update<F>(&self, edit: F) -> Result<FilterSettings, ScoutError>
    where
        F: FnOnce(&mut FilterSettings) -> Result<(), ScoutError>,
    {
        let mut guard = self.current.write().await;
        let mut next = guard.clone();
        edit(&mut next)?;
        *guard = next.clone();

        if let Err(e) = save_settings(&self.path, &next).await {
            tracing::error!("Failed to save settings to {:?}: {}", self.path, e);
        }
        Ok(next)
    }

    pub async fn reset(&self) -> FilterSettings {
        // Resetting cannot fail validation.
        self.update(|s| {
            *s = FilterSettings::default();
            Ok(())
        })
        .await
        .unwrap_or_default()
    }
}

// ── Settings file ──────────────────────────────────────────────

/// Missing or unreadable file yields the defaults.
pub async fn load_settings(path: &Path) -> FilterSettings {
    match read_json::<FilterSettings>(path).await {
        Ok(Some(s)) => s,
        Ok(None) => {
            tracing::info!("No settings file at {:?}, using defaults", path);
            FilterSettings::default()
        }
        Err(e) => {
            tracing::warn!("Could not read settings from {:?}, using defaults: {}", path, e);
            FilterSettings::default()
        }
    }
}

pub async fn save_settings(path: &Path, settings: &FilterSettings) -> Result<(), ScoutError> {
    write_json(path, settings).await
}

// ── Seen file ──────────────────────────────────────────────────

pub async fn load_seen(path: &Path, cap: usize) -> SeenSet {
    match read_json::<Vec<String>>(path).await {
        Ok(Some(tokens)) => SeenSet::from_tokens(tokens, cap),
        Ok(None) => SeenSet::new(cap),
        Err(e) => {
            tracing::warn!("Could not read seen listings from {:?}, starting empty: {}", path, e);
            SeenSet::new(cap)
        }
    }
}

pub async fn save_seen(path: &Path, seen: &SeenSet) -> Result<(), ScoutError> {
    write_json(path, &seen.to_vec()).await
}

// ── Helpers ────────────────────────────────────────────────────

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ScoutError> {
    let content = match fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write to a sibling temp file, then rename over the target.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ScoutError> {
    let content = serde_json::to_string_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        if let Err(cleanup) = fs::remove_file(&tmp).await {
            tracing::warn!("Could not remove {:?}: {}", tmp, cleanup);
        }
        return Err(e.into());
    }
    Ok(())
}
