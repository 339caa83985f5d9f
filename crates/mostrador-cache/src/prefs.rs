//! # Preference Repository
//!
//! Global (not per-user) UI preferences: color theme, last selected
//! store, catalog view mode. A tiny key/value table; unknown or
//! unparseable values fall back to defaults rather than erroring.

use sqlx::{Row, SqlitePool};
use tracing::warn;

use mostrador_core::{Theme, ViewMode};

use crate::error::CacheResult;

const KEY_THEME: &str = "theme";
const KEY_LAST_STORE: &str = "last_store";
const KEY_VIEW_MODE: &str = "view_mode";

/// Repository for the global preference store.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    pool: SqlitePool,
}

impl PreferenceRepository {
    /// Creates a new PreferenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PreferenceRepository { pool }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM preferences WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns the stored theme, defaulting when unset or unknown.
    pub async fn theme(&self) -> CacheResult<Theme> {
        Ok(match self.get(KEY_THEME).await?.as_deref() {
            Some("light") => Theme::Light,
            Some("dark") => Theme::Dark,
            Some(other) => {
                warn!(value = %other, "Unknown theme preference, using default");
                Theme::default()
            }
            None => Theme::default(),
        })
    }

    pub async fn set_theme(&self, theme: Theme) -> CacheResult<()> {
        let value = match theme {
            Theme::Light => "light",
            Theme::Dark => "dark",
        };
        self.set(KEY_THEME, value).await
    }

    /// Returns the last selected store id, if any.
    pub async fn last_store(&self) -> CacheResult<Option<String>> {
        self.get(KEY_LAST_STORE).await
    }

    pub async fn set_last_store(&self, store_id: &str) -> CacheResult<()> {
        self.set(KEY_LAST_STORE, store_id).await
    }

    /// Returns the stored catalog view mode, defaulting when unset.
    pub async fn view_mode(&self) -> CacheResult<ViewMode> {
        Ok(match self.get(KEY_VIEW_MODE).await?.as_deref() {
            Some("cards") => ViewMode::Cards,
            Some("table") => ViewMode::Table,
            Some(other) => {
                warn!(value = %other, "Unknown view mode preference, using default");
                ViewMode::default()
            }
            None => ViewMode::default(),
        })
    }

    pub async fn set_view_mode(&self, mode: ViewMode) -> CacheResult<()> {
        let value = match mode {
            ViewMode::Table => "table",
            ViewMode::Cards => "cards",
        };
        self.set(KEY_VIEW_MODE, value).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Cache, CacheConfig};

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        let prefs = cache.preferences();

        assert_eq!(prefs.theme().await.unwrap(), Theme::Dark);
        assert_eq!(prefs.view_mode().await.unwrap(), ViewMode::Table);
        assert!(prefs.last_store().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        let prefs = cache.preferences();

        prefs.set_theme(Theme::Light).await.unwrap();
        prefs.set_last_store("BA001GC").await.unwrap();
        prefs.set_view_mode(ViewMode::Cards).await.unwrap();

        assert_eq!(prefs.theme().await.unwrap(), Theme::Light);
        assert_eq!(prefs.last_store().await.unwrap().as_deref(), Some("BA001GC"));
        assert_eq!(prefs.view_mode().await.unwrap(), ViewMode::Cards);

        // overwriting keeps a single row per key
        prefs.set_theme(Theme::Dark).await.unwrap();
        assert_eq!(prefs.theme().await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_unknown_value_falls_back() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO preferences (key, value) VALUES ('theme', 'sepia')")
            .execute(cache.pool())
            .await
            .unwrap();

        assert_eq!(cache.preferences().theme().await.unwrap(), Theme::default());
    }
}
