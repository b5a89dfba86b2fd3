// Application state (AppState)

use crate::compliance::store::ComplianceStore;
use crate::compliance::tracker::SeedingComplianceTracker;
use crate::core::config::Config;
use crate::metrics::collector::Metrics;
use crate::stores::{peer_store::PeerStore, torrent_cache::TorrentCache, user_cache::UserCache};
use crate::wal::wal::Wal;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// Shared application state, cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Swarm state for announce responses
    pub peer_store: Arc<PeerStore>,

    /// Account cache for passkey authentication
    pub user_cache: Arc<UserCache>,

    /// Torrent cache for info_hash authorization
    pub torrent_cache: Arc<TorrentCache>,

    /// Per-(user, torrent) compliance records
    pub compliance_store: Arc<ComplianceStore>,

    /// Hit-and-run evaluation over the announce stream
    pub compliance: Arc<SeedingComplianceTracker>,

    /// Announce counters
    pub metrics: Arc<Metrics>,

    /// Write-ahead log backing the caches and compliance records
    pub wal: Arc<Wal>,

    /// Immutable startup configuration
    pub config: Arc<Config>,

    /// Current seeding requirement in minutes. Seeded from config,
    /// adjustable at runtime; every evaluation reads the live value.
    pub required_seeding_minutes: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: Config, wal: Wal) -> Self {
        let wal = Arc::new(wal);
        let compliance_store = Arc::new(ComplianceStore::new());
        let compliance = Arc::new(SeedingComplianceTracker::new(
            Arc::clone(&compliance_store),
            Arc::clone(&wal),
        ));
        let required_seeding_minutes =
            Arc::new(AtomicU64::new(config.compliance.required_seeding_minutes));

        Self {
            peer_store: Arc::new(PeerStore::new()),
            user_cache: Arc::new(UserCache::new()),
            torrent_cache: Arc::new(TorrentCache::new()),
            compliance_store,
            compliance,
            metrics: Arc::new(Metrics::new()),
            wal,
            config: Arc::new(config),
            required_seeding_minutes,
        }
    }
}
