use crate::models::torrent::Torrent;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory cache of registered torrents, keyed by info hash.
pub struct TorrentCache {
    torrents: DashMap<[u8; 20], Arc<Torrent>>,
}

impl TorrentCache {
    pub fn new() -> Self {
        Self {
            torrents: DashMap::new(),
        }
    }

    /// Insert a torrent, replacing any existing entry with the same hash.
    pub fn add_torrent(&self, torrent: Torrent) {
        self.torrents.insert(torrent.info_hash, Arc::new(torrent));
    }

    pub fn remove_torrent(&self, info_hash: [u8; 20]) -> Option<Arc<Torrent>> {
        self.torrents.remove(&info_hash).map(|(_, torrent)| torrent)
    }

    pub fn get_torrent(&self, info_hash: [u8; 20]) -> Option<Arc<Torrent>> {
        self.torrents
            .get(&info_hash)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Snapshot of every cached torrent, used for WAL compaction.
    pub fn all_torrents(&self) -> Vec<Arc<Torrent>> {
        self.torrents
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.torrents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.torrents.is_empty()
    }
}

impl Default for TorrentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let cache = TorrentCache::new();
        cache.add_torrent(Torrent::new(10, [3u8; 20], true));

        let torrent = cache.get_torrent([3u8; 20]).unwrap();
        assert_eq!(torrent.id, 10);
        assert!(cache.get_torrent([4u8; 20]).is_none());
    }

    #[test]
    fn test_remove() {
        let cache = TorrentCache::new();
        cache.add_torrent(Torrent::new(10, [3u8; 20], true));

        let removed = cache.remove_torrent([3u8; 20]).unwrap();
        assert_eq!(removed.id, 10);
        assert!(cache.is_empty());
    }
}
