use serde::Serialize;

/// Per-(user, torrent) seeding-compliance accounting.
///
/// One record exists per unique (user_id, torrent_id) pair, created lazily
/// on the first announce for that pair and mutated on every subsequent one.
/// Records are never deleted by the evaluation logic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComplianceRecord {
    /// User ID from the user cache
    pub user_id: u32,
    /// Torrent ID from the torrent cache
    pub torrent_id: u32,
    /// Unix millisecond timestamp of the first announce for this pair
    pub downloaded_at: i64,
    /// Unix millisecond timestamp of the last announce reporting left == 0;
    /// None until the peer has been seen seeding at least once
    pub last_seeded_at: Option<i64>,
    /// Cumulative confirmed seeding time in whole minutes, never decreases
    pub total_seeding_time: i64,
    /// Sticky hit-and-run flag; the evaluation algorithm never clears it
    pub is_hit_and_run: bool,
}

impl ComplianceRecord {
    /// Create the initial record for a pair first observed at `now_ms`.
    ///
    /// A peer that is already seeding on its first announce starts its
    /// seeding clock immediately; a leecher starts with no clock at all.
    pub fn new(user_id: u32, torrent_id: u32, now_ms: i64, is_seeding: bool) -> Self {
        Self {
            user_id,
            torrent_id,
            downloaded_at: now_ms,
            last_seeded_at: if is_seeding { Some(now_ms) } else { None },
            total_seeding_time: 0,
            is_hit_and_run: false,
        }
    }
}
