pub mod peer_store;
pub mod torrent_cache;
pub mod user_cache;
