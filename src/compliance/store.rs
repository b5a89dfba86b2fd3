use crate::models::compliance::ComplianceRecord;
use dashmap::DashMap;

/// In-memory store of compliance records, one per (user_id, torrent_id).
///
/// All mutation goes through `with_record`, which holds the pair's map entry
/// for the duration of the closure. That gives each pair the mutual
/// exclusion the evaluation's read-modify-write sequence needs: two
/// announces for the same pair serialize, announces for different pairs
/// do not contend (beyond shard locking).
pub struct ComplianceStore {
    records: DashMap<(u32, u32), ComplianceRecord>,
}

impl ComplianceStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Run `f` against the record for (user_id, torrent_id), creating it
    /// with `init` first if this is the pair's first announce.
    ///
    /// The entry guard is held across `f`, so creation and mutation are a
    /// single atomic step per pair and duplicate-create races cannot occur.
    pub fn with_record<T>(
        &self,
        user_id: u32,
        torrent_id: u32,
        init: impl FnOnce() -> ComplianceRecord,
        f: impl FnOnce(&mut ComplianceRecord) -> T,
    ) -> T {
        let mut entry = self
            .records
            .entry((user_id, torrent_id))
            .or_insert_with(init);
        f(entry.value_mut())
    }

    pub fn get(&self, user_id: u32, torrent_id: u32) -> Option<ComplianceRecord> {
        self.records
            .get(&(user_id, torrent_id))
            .map(|entry| entry.value().clone())
    }

    /// Restore a record verbatim, used during WAL replay at startup.
    pub fn insert(&self, record: ComplianceRecord) {
        self.records
            .insert((record.user_id, record.torrent_id), record);
    }

    /// Clear the hit-and-run flag on one record.
    ///
    /// This is the operator-facing escape hatch; the evaluation algorithm
    /// itself never clears the flag. Returns the updated record, or None
    /// if the pair has never announced.
    pub fn clear_hit_and_run(&self, user_id: u32, torrent_id: u32) -> Option<ComplianceRecord> {
        self.records
            .get_mut(&(user_id, torrent_id))
            .map(|mut entry| {
                entry.value_mut().is_hit_and_run = false;
                entry.value().clone()
            })
    }

    /// All records currently flagged as hit-and-run.
    pub fn flagged(&self) -> Vec<ComplianceRecord> {
        self.records
            .iter()
            .filter(|entry| entry.value().is_hit_and_run)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn flagged_count(&self) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.value().is_hit_and_run)
            .count()
    }

    /// Snapshot of every record, used for WAL compaction.
    pub fn all_records(&self) -> Vec<ComplianceRecord> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ComplianceStore {
    fn default() -> Self {
        Self::new()
    }
}
