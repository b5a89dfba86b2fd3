use crate::compliance::store::ComplianceStore;
use crate::core::error::ComplianceError;
use crate::models::compliance::ComplianceRecord;
use crate::utils::time::elapsed_whole_minutes;
use crate::validation::params::AnnounceEvent;
use crate::wal::wal::{Wal, WalOperation};
use std::sync::Arc;
use tracing::{debug, warn};

/// Hit-and-run detection over the announce stream.
///
/// Each announce for a (user, torrent) pair updates that pair's compliance
/// record: time spent between consecutive seeding announces (left == 0)
/// accrues as whole minutes, and a `stopped` event before the configured
/// seeding requirement marks the pair as a hit-and-run.
///
/// Seeding time is a telescoping sum: every seeding announce credits the
/// minutes since the previous one and resets the clock to `now`. A missed
/// announce therefore only loses the uncredited tail since the last
/// announce, never the whole session.
pub struct SeedingComplianceTracker {
    store: Arc<ComplianceStore>,
    wal: Arc<Wal>,
}

impl SeedingComplianceTracker {
    pub fn new(store: Arc<ComplianceStore>, wal: Arc<Wal>) -> Self {
        Self { store, wal }
    }

    /// Apply one announce to the pair's compliance record.
    ///
    /// `now_ms` is the announce's observed timestamp in epoch milliseconds;
    /// announces for one pair must be applied in timestamp order, which the
    /// store's per-pair entry lock guarantees matches arrival order.
    ///
    /// The updated state is journaled to the WAL before the in-memory
    /// record is touched, so a persistence failure leaves the record
    /// unchanged and the same announce can be retried safely as long as
    /// the caller reuses the same `now_ms`.
    pub fn evaluate(
        &self,
        user_id: u32,
        torrent_id: u32,
        left: u64,
        event: Option<AnnounceEvent>,
        now_ms: i64,
        required_seeding_minutes: u64,
    ) -> Result<ComplianceRecord, ComplianceError> {
        // Taken before the record's entry guard: compaction holds the gate
        // exclusively while it snapshots, so it can never read this pair
        // between the journal write below and the in-memory commit.
        let _gate = self.wal.append_gate();

        self.store.with_record(
            user_id,
            torrent_id,
            || ComplianceRecord::new(user_id, torrent_id, now_ms, left == 0),
            |record| {
                let mut next = record.clone();

                if left == 0 {
                    if let Some(last_seeded) = next.last_seeded_at {
                        next.total_seeding_time += elapsed_whole_minutes(last_seeded, now_ms);
                    }
                    // Reset the clock on every seeding announce so the next
                    // interval diffs against this one.
                    next.last_seeded_at = Some(now_ms);
                }

                // The stop check runs after the seeding credit above, so a
                // stop-while-seeding announce counts its final interval
                // before the requirement is evaluated. Any event other than
                // `stopped` is a no-op for the compliance check.
                if event == Some(AnnounceEvent::Stopped)
                    && (next.total_seeding_time as u64) < required_seeding_minutes
                {
                    if !next.is_hit_and_run {
                        warn!(
                            user_id = user_id,
                            torrent_id = torrent_id,
                            total_seeding_time = next.total_seeding_time,
                            required_seeding_minutes = required_seeding_minutes,
                            "Hit-and-run detected: peer stopped before meeting seeding requirement"
                        );
                    }
                    next.is_hit_and_run = true;
                }

                // Journal before committing: a failed write leaves the
                // in-memory record untouched, and on restart the replayed
                // line restores exactly the state returned here.
                self.wal
                    .log_operation(&WalOperation::UpsertRecord {
                        record: next.clone(),
                    })
                    .map_err(ComplianceError::Persistence)?;
                *record = next.clone();

                debug!(
                    user_id = user_id,
                    torrent_id = torrent_id,
                    left = left,
                    total_seeding_time = next.total_seeding_time,
                    is_hit_and_run = next.is_hit_and_run,
                    "Compliance record evaluated"
                );

                Ok(next)
            },
        )
    }

    pub fn store(&self) -> &ComplianceStore {
        &self.store
    }
}
