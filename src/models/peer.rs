use std::net::IpAddr;

/// An active peer in a torrent swarm.
#[derive(Clone, Debug)]
pub struct Peer {
    /// User ID from the user cache
    pub user_id: u32,
    /// Torrent ID from the torrent cache
    pub torrent_id: u32,
    /// 20-byte peer identifier
    pub peer_id: [u8; 20],
    /// IP address (IPv4 or IPv6)
    pub ip: IpAddr,
    /// Port number
    pub port: u16,
    /// Bytes left to download (0 for seeders)
    pub left: u64,
    /// Unix timestamp (seconds) of last announce
    pub last_announce: i64,
    /// Whether this peer is a seeder (left == 0)
    pub is_seeder: bool,
}

impl Peer {
    pub fn new(
        user_id: u32,
        torrent_id: u32,
        peer_id: [u8; 20],
        ip: IpAddr,
        port: u16,
        left: u64,
        last_announce: i64,
    ) -> Self {
        Self {
            user_id,
            torrent_id,
            peer_id,
            ip,
            port,
            left,
            last_announce,
            is_seeder: left == 0,
        }
    }
}
