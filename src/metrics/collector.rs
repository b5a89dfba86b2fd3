use crate::compliance::store::ComplianceStore;
use crate::stores::peer_store::PeerStore;
use crate::stores::torrent_cache::TorrentCache;
use crate::stores::user_cache::UserCache;
use crate::utils::time::current_timestamp;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub struct Metrics {
    pub total_announces: AtomicU64,
    pub successful_announces: AtomicU64,
    pub failed_announces: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_announces: u64,
    pub successful_announces: u64,
    pub failed_announces: u64,
    pub success_rate: f64,
    pub active_peers: usize,
    pub active_torrents: usize,
    pub cached_torrents: usize,
    pub cached_users: usize,
    pub compliance_records: usize,
    pub hit_and_run_peers: usize,
    pub uptime_seconds: i64,
    pub requests_per_second: f64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            total_announces: AtomicU64::new(0),
            successful_announces: AtomicU64::new(0),
            failed_announces: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn increment_announces(&self) {
        self.total_announces.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_successful(&self) {
        self.successful_announces.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed_announces.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters plus derived rates and the current sizes of
    /// the peer, cache, and compliance stores.
    pub fn get_snapshot(
        &self,
        peer_store: &PeerStore,
        user_cache: &UserCache,
        torrent_cache: &TorrentCache,
        compliance_store: &ComplianceStore,
    ) -> MetricsSnapshot {
        let current_time = current_timestamp();

        let total_announces = self.total_announces.load(Ordering::Relaxed);
        let successful_announces = self.successful_announces.load(Ordering::Relaxed);
        let failed_announces = self.failed_announces.load(Ordering::Relaxed);

        let success_rate = if total_announces > 0 {
            (successful_announces as f64 / total_announces as f64) * 100.0
        } else {
            0.0
        };

        let uptime_seconds = current_time - self.start_time;

        let requests_per_second = if uptime_seconds > 0 {
            total_announces as f64 / uptime_seconds as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            total_announces,
            successful_announces,
            failed_announces,
            success_rate,
            active_peers: peer_store.total_peers(),
            active_torrents: peer_store.active_torrents(),
            cached_torrents: torrent_cache.len(),
            cached_users: user_cache.len(),
            compliance_records: compliance_store.len(),
            hit_and_run_peers: compliance_store.flagged_count(),
            uptime_seconds,
            requests_per_second,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::compliance::ComplianceRecord;

    fn empty_snapshot(metrics: &Metrics) -> MetricsSnapshot {
        metrics.get_snapshot(
            &PeerStore::new(),
            &UserCache::new(),
            &TorrentCache::new(),
            &ComplianceStore::new(),
        )
    }

    #[test]
    fn test_new_metrics() {
        let metrics = Metrics::new();

        assert_eq!(metrics.total_announces.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.successful_announces.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.failed_announces.load(Ordering::Relaxed), 0);
        assert!(metrics.start_time > 0);
    }

    #[test]
    fn test_increment_counters() {
        let metrics = Metrics::new();

        metrics.increment_announces();
        metrics.increment_announces();
        metrics.increment_successful();
        metrics.increment_failed();

        let snapshot = empty_snapshot(&metrics);
        assert_eq!(snapshot.total_announces, 2);
        assert_eq!(snapshot.successful_announces, 1);
        assert_eq!(snapshot.failed_announces, 1);
        assert_eq!(snapshot.success_rate, 50.0);
    }

    #[test]
    fn test_snapshot_empty_stores() {
        let metrics = Metrics::new();
        let snapshot = empty_snapshot(&metrics);

        assert_eq!(snapshot.active_peers, 0);
        assert_eq!(snapshot.compliance_records, 0);
        assert_eq!(snapshot.hit_and_run_peers, 0);
        assert_eq!(snapshot.success_rate, 0.0);
    }

    #[test]
    fn test_snapshot_counts_flagged_records() {
        let metrics = Metrics::new();
        let compliance_store = ComplianceStore::new();

        compliance_store.insert(ComplianceRecord {
            user_id: 1,
            torrent_id: 1,
            downloaded_at: 0,
            last_seeded_at: None,
            total_seeding_time: 0,
            is_hit_and_run: true,
        });
        compliance_store.insert(ComplianceRecord {
            user_id: 1,
            torrent_id: 2,
            downloaded_at: 0,
            last_seeded_at: None,
            total_seeding_time: 90,
            is_hit_and_run: false,
        });

        let snapshot = metrics.get_snapshot(
            &PeerStore::new(),
            &UserCache::new(),
            &TorrentCache::new(),
            &compliance_store,
        );

        assert_eq!(snapshot.compliance_records, 2);
        assert_eq!(snapshot.hit_and_run_peers, 1);
    }
}
