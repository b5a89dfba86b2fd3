use crate::models::peer::Peer;
use crate::utils::time::is_expired;
use dashmap::DashMap;
use rand::seq::SliceRandom;

/// In-memory swarm state: peers grouped per torrent.
pub struct PeerStore {
    swarms: DashMap<[u8; 20], DashMap<[u8; 20], Peer>>,
}

impl PeerStore {
    pub fn new() -> Self {
        Self {
            swarms: DashMap::new(),
        }
    }

    /// Insert or refresh a peer's entry in its torrent's swarm.
    pub fn upsert_peer(&self, info_hash: [u8; 20], peer: Peer) {
        let swarm = self.swarms.entry(info_hash).or_default();
        swarm.insert(peer.peer_id, peer);
    }

    /// Remove a peer, returning it if it was present.
    pub fn remove_peer(&self, info_hash: [u8; 20], peer_id: [u8; 20]) -> Option<Peer> {
        let swarm = self.swarms.get(&info_hash)?;
        swarm.remove(&peer_id).map(|(_, peer)| peer)
    }

    /// Random selection of up to `num_want` peers, excluding the requester.
    pub fn get_peers(
        &self,
        info_hash: [u8; 20],
        num_want: u32,
        exclude_peer_id: [u8; 20],
    ) -> Vec<Peer> {
        let swarm = match self.swarms.get(&info_hash) {
            Some(swarm) => swarm,
            None => return Vec::new(),
        };

        let mut peers: Vec<Peer> = swarm
            .iter()
            .filter(|entry| *entry.key() != exclude_peer_id)
            .map(|entry| entry.value().clone())
            .collect();

        drop(swarm);

        peers.shuffle(&mut rand::rng());
        peers.truncate(num_want as usize);

        peers
    }

    /// (seeders, leechers) counts for a torrent's swarm.
    pub fn get_stats(&self, info_hash: [u8; 20]) -> (u32, u32) {
        let swarm = match self.swarms.get(&info_hash) {
            Some(swarm) => swarm,
            None => return (0, 0),
        };

        let mut seeders = 0;
        let mut leechers = 0;
        for entry in swarm.iter() {
            if entry.value().is_seeder {
                seeders += 1;
            } else {
                leechers += 1;
            }
        }

        (seeders, leechers)
    }

    /// Drop peers whose last announce is older than `timeout` seconds.
    /// Returns the number of peers removed.
    pub fn cleanup_stale_peers(&self, timeout: i64, current_time: i64) -> usize {
        let mut removed = 0;

        for swarm in self.swarms.iter() {
            let stale: Vec<[u8; 20]> = swarm
                .iter()
                .filter(|entry| is_expired(entry.value().last_announce, timeout, current_time))
                .map(|entry| *entry.key())
                .collect();

            for peer_id in stale {
                if swarm.remove(&peer_id).is_some() {
                    removed += 1;
                }
            }
        }

        // Drop swarms that emptied out
        self.swarms.retain(|_, swarm| !swarm.is_empty());

        removed
    }

    pub fn total_peers(&self) -> usize {
        self.swarms.iter().map(|swarm| swarm.len()).sum()
    }

    pub fn active_torrents(&self) -> usize {
        self.swarms.len()
    }
}

impl Default for PeerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn peer(peer_id: u8, left: u64, last_announce: i64) -> Peer {
        Peer::new(
            1,
            1,
            [peer_id; 20],
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, peer_id)),
            6881,
            left,
            last_announce,
        )
    }

    const HASH: [u8; 20] = [9u8; 20];

    #[test]
    fn test_upsert_and_stats() {
        let store = PeerStore::new();

        store.upsert_peer(HASH, peer(1, 0, 100));
        store.upsert_peer(HASH, peer(2, 500, 100));
        store.upsert_peer(HASH, peer(3, 0, 100));

        assert_eq!(store.get_stats(HASH), (2, 1));
        assert_eq!(store.total_peers(), 3);
    }

    #[test]
    fn test_upsert_replaces_same_peer_id() {
        let store = PeerStore::new();

        store.upsert_peer(HASH, peer(1, 500, 100));
        // Peer finished downloading
        store.upsert_peer(HASH, peer(1, 0, 200));

        assert_eq!(store.total_peers(), 1);
        assert_eq!(store.get_stats(HASH), (1, 0));
    }

    #[test]
    fn test_remove_peer() {
        let store = PeerStore::new();
        store.upsert_peer(HASH, peer(1, 0, 100));

        assert!(store.remove_peer(HASH, [1u8; 20]).is_some());
        assert!(store.remove_peer(HASH, [1u8; 20]).is_none());
        assert_eq!(store.get_stats(HASH), (0, 0));
    }

    #[test]
    fn test_get_peers_excludes_requester() {
        let store = PeerStore::new();
        store.upsert_peer(HASH, peer(1, 0, 100));
        store.upsert_peer(HASH, peer(2, 0, 100));

        let peers = store.get_peers(HASH, 50, [1u8; 20]);
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].peer_id, [2u8; 20]);
    }

    #[test]
    fn test_get_peers_respects_num_want() {
        let store = PeerStore::new();
        for i in 1..=10 {
            store.upsert_peer(HASH, peer(i, 0, 100));
        }

        let peers = store.get_peers(HASH, 4, [0u8; 20]);
        assert_eq!(peers.len(), 4);
    }

    #[test]
    fn test_get_peers_unknown_torrent() {
        let store = PeerStore::new();
        assert!(store.get_peers(HASH, 50, [0u8; 20]).is_empty());
    }

    #[test]
    fn test_cleanup_stale_peers() {
        let store = PeerStore::new();
        store.upsert_peer(HASH, peer(1, 0, 100));
        store.upsert_peer(HASH, peer(2, 0, 900));

        let removed = store.cleanup_stale_peers(300, 1000);

        assert_eq!(removed, 1);
        assert_eq!(store.total_peers(), 1);
        assert!(store.remove_peer(HASH, [2u8; 20]).is_some());
    }

    #[test]
    fn test_cleanup_drops_empty_swarms() {
        let store = PeerStore::new();
        store.upsert_peer(HASH, peer(1, 0, 100));

        store.cleanup_stale_peers(300, 100_000);

        assert_eq!(store.active_torrents(), 0);
    }
}
