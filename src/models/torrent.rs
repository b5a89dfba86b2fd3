/// A registered torrent, keyed by its info hash.
#[derive(Clone, Debug)]
pub struct Torrent {
    /// Torrent ID
    pub id: u32,
    /// 20-byte SHA-1 info hash
    pub info_hash: [u8; 20],
    /// Inactive torrents are rejected at announce time
    pub is_active: bool,
}

impl Torrent {
    pub fn new(id: u32, info_hash: [u8; 20], is_active: bool) -> Self {
        Self {
            id,
            info_hash,
            is_active,
        }
    }
}
