//! Application Caches
//!
//! Every cache the bot uses for music-tracking API responses, built once at
//! startup and passed to consumers by `Arc`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::cache::{Cache, ShardedCache};
use crate::config::Config;
use crate::report::{render_table, ManagedCache, NamedStats};

/// Decoded upstream response document.
pub type Payload = Arc<Value>;

/// Guild member ids mapped to their linked usernames.
pub type MemberMap = Arc<HashMap<u64, String>>;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);

// == Api Caches ==
/// Named caches for upstream API responses.
#[derive(Debug)]
pub struct ApiCaches {
    /// `user.getinfo` responses by username
    pub user: ShardedCache<String, Payload>,
    /// Linked members per guild id
    pub members: Cache<u64, MemberMap>,
    pub album: ShardedCache<String, Payload>,
    pub artist: ShardedCache<String, Payload>,
    pub track: ShardedCache<String, Payload>,
    /// Cover art URLs by album key
    pub cover: ShardedCache<String, String>,
    pub top_albums: Cache<String, Payload>,
    pub top_artists: Cache<String, Payload>,
    pub top_tracks: Cache<String, Payload>,
    pub recent_tracks: Cache<String, Payload>,
    /// Play counts by derived key
    pub plays: ShardedCache<String, u64>,
}

impl ApiCaches {
    // == Constructor ==
    /// Builds every cache with its preset policy.
    pub fn new(config: &Config) -> Self {
        let caches = Self {
            user: ShardedCache::new(&config.cache_config(MINUTE, 50_000, true)),
            members: Cache::new(&config.cache_config(10 * MINUTE, 2_000, false)),
            album: ShardedCache::new(&config.cache_config(12 * HOUR, 64_000, true)),
            artist: ShardedCache::new(&config.cache_config(12 * HOUR, 64_000, true)),
            track: ShardedCache::new(&config.cache_config(12 * HOUR, 64_000, true)),
            cover: ShardedCache::new(&config.cache_config(12 * HOUR, 50_000, true)),
            top_albums: Cache::new(&config.cache_config(15 * MINUTE, 1_000, false)),
            top_artists: Cache::new(&config.cache_config(15 * MINUTE, 1_000, false)),
            top_tracks: Cache::new(&config.cache_config(15 * MINUTE, 1_000, false)),
            recent_tracks: Cache::new(&config.cache_config(15 * MINUTE, 1_000, false)),
            plays: ShardedCache::new(&config.cache_config(15 * MINUTE, 50_000, true)),
        };

        info!("Initialized {} caches", caches.named().len());
        caches
    }

    /// Every cache with its report name, in a fixed order.
    pub fn named(&self) -> Vec<(&'static str, &dyn ManagedCache)> {
        let named: [(&'static str, &dyn ManagedCache); 11] = [
            ("user", &self.user),
            ("members", &self.members),
            ("album", &self.album),
            ("artist", &self.artist),
            ("track", &self.track),
            ("cover", &self.cover),
            ("top_albums", &self.top_albums),
            ("top_artists", &self.top_artists),
            ("top_tracks", &self.top_tracks),
            ("recent_tracks", &self.recent_tracks),
            ("plays", &self.plays),
        ];
        Vec::from(named)
    }

    /// Looks a cache up by report name.
    pub fn find(&self, name: &str) -> Option<&dyn ManagedCache> {
        self.named()
            .into_iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, cache)| cache)
    }

    // == Stats ==
    pub fn stats(&self) -> Vec<NamedStats> {
        self.named()
            .into_iter()
            .map(|(name, cache)| NamedStats::new(name, cache.stats()))
            .collect()
    }

    /// Text table of every cache's counters.
    pub fn report(&self) -> String {
        render_table(&self.stats())
    }

    // == Close ==
    /// Closes every cache; returns once all cleanup tasks have stopped.
    pub async fn close(&self) {
        self.user.close().await;
        self.members.close().await;
        self.album.close().await;
        self.artist.close().await;
        self.track.close().await;
        self.cover.close().await;
        self.top_albums.close().await;
        self.top_artists.close().await;
        self.top_tracks.close().await;
        self.recent_tracks.close().await;
        self.plays.close().await;
        info!("All caches closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{derive_key, KeyParams};
    use serde_json::json;

    fn config() -> Config {
        Config {
            cleanup_interval: Duration::ZERO,
            ..Config::default()
        }
    }

    #[test]
    fn test_every_cache_is_named_once() {
        let caches = ApiCaches::new(&config());
        let names: Vec<_> = caches.named().into_iter().map(|(name, _)| name).collect();

        assert_eq!(names.len(), 11);
        let mut unique = names.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_sharded_presets_use_config() {
        let caches = ApiCaches::new(&config());
        assert_eq!(caches.user.shard_count(), 4);
        assert_eq!(caches.plays.shard_count(), 4);
    }

    #[test]
    fn test_find_and_stats() {
        let caches = ApiCaches::new(&config());
        let key = derive_key("user.gettopartists", &KeyParams::new().with("user", "rj"));
        caches.top_artists.insert(key.clone(), Arc::new(json!({"artist": []})));
        let _ = caches.top_artists.get(&key);

        let view = caches.find("top_artists").unwrap();
        assert_eq!(view.len(), 1);
        assert!(caches.find("nope").is_none());

        let stats = caches.stats();
        let row = stats.iter().find(|row| row.name == "top_artists").unwrap();
        assert_eq!(row.stats.hits, 1);
    }

    #[test]
    fn test_report_lists_every_cache() {
        let caches = ApiCaches::new(&config());
        let report = caches.report();

        // header + rule + one row per cache
        assert_eq!(report.lines().count(), 2 + 11);
        assert!(report.contains("recent_tracks"));
    }

    #[tokio::test]
    async fn test_close_stops_all_cleanup() {
        let caches = ApiCaches::new(&Config {
            cleanup_interval: Duration::from_millis(10),
            ..Config::default()
        });
        caches.plays.insert("k".to_string(), 3);
        assert!(caches.top_tracks.has_cleanup_task());

        caches.close().await;

        assert!(!caches.top_tracks.has_cleanup_task());
        assert!(caches.plays.is_empty());

        caches.close().await;
    }
}
