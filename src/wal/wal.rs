use crate::models::compliance::ComplianceRecord;
use anyhow::{bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Mutex, RwLock, RwLockReadGuard};

/// WAL operation types
///
/// `UpsertRecord` carries the full compliance-record state, so replaying a
/// journal in order leaves the store at the last written state per pair.
#[derive(Debug, Clone, PartialEq)]
pub enum WalOperation {
    AddUser {
        id: u32,
        passkey: [u8; 32],
    },
    RemoveUser {
        passkey: [u8; 32],
    },
    AddTorrent {
        id: u32,
        info_hash: [u8; 20],
    },
    RemoveTorrent {
        info_hash: [u8; 20],
    },
    UpsertRecord {
        record: ComplianceRecord,
    },
}

impl WalOperation {
    fn serialize(&self) -> String {
        match self {
            WalOperation::AddUser { id, passkey } => {
                format!("ADD_USER|{}|{}", id, hex::encode(passkey))
            }
            WalOperation::RemoveUser { passkey } => {
                format!("REMOVE_USER|{}", hex::encode(passkey))
            }
            WalOperation::AddTorrent { id, info_hash } => {
                format!("ADD_TORRENT|{}|{}", id, hex::encode(info_hash))
            }
            WalOperation::RemoveTorrent { info_hash } => {
                format!("REMOVE_TORRENT|{}", hex::encode(info_hash))
            }
            WalOperation::UpsertRecord { record } => {
                let last_seeded = match record.last_seeded_at {
                    Some(ts) => ts.to_string(),
                    None => "-".to_string(),
                };
                format!(
                    "RECORD|{}|{}|{}|{}|{}|{}",
                    record.user_id,
                    record.torrent_id,
                    record.downloaded_at,
                    last_seeded,
                    record.total_seeding_time,
                    if record.is_hit_and_run { "1" } else { "0" }
                )
            }
        }
    }

    fn deserialize(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split('|').collect();

        match parts.first() {
            Some(&"ADD_USER") => {
                if parts.len() != 3 {
                    bail!("Invalid ADD_USER format");
                }
                let id = parts[1].parse::<u32>().context("Invalid user ID")?;
                let passkey = decode_passkey(parts[2])?;
                Ok(WalOperation::AddUser { id, passkey })
            }
            Some(&"REMOVE_USER") => {
                if parts.len() != 2 {
                    bail!("Invalid REMOVE_USER format");
                }
                let passkey = decode_passkey(parts[1])?;
                Ok(WalOperation::RemoveUser { passkey })
            }
            Some(&"ADD_TORRENT") => {
                if parts.len() != 3 {
                    bail!("Invalid ADD_TORRENT format");
                }
                let id = parts[1].parse::<u32>().context("Invalid torrent ID")?;
                let info_hash = decode_info_hash(parts[2])?;
                Ok(WalOperation::AddTorrent { id, info_hash })
            }
            Some(&"REMOVE_TORRENT") => {
                if parts.len() != 2 {
                    bail!("Invalid REMOVE_TORRENT format");
                }
                let info_hash = decode_info_hash(parts[1])?;
                Ok(WalOperation::RemoveTorrent { info_hash })
            }
            Some(&"RECORD") => {
                if parts.len() != 7 {
                    bail!("Invalid RECORD format");
                }
                let user_id = parts[1].parse::<u32>().context("Invalid user ID")?;
                let torrent_id = parts[2].parse::<u32>().context("Invalid torrent ID")?;
                let downloaded_at = parts[3]
                    .parse::<i64>()
                    .context("Invalid downloaded_at timestamp")?;
                let last_seeded_at = if parts[4] == "-" {
                    None
                } else {
                    Some(
                        parts[4]
                            .parse::<i64>()
                            .context("Invalid last_seeded_at timestamp")?,
                    )
                };
                let total_seeding_time = parts[5]
                    .parse::<i64>()
                    .context("Invalid total_seeding_time")?;
                let is_hit_and_run = match parts[6] {
                    "0" => false,
                    "1" => true,
                    other => bail!("Invalid hit-and-run flag: {}", other),
                };

                if total_seeding_time < 0 {
                    bail!("total_seeding_time must be non-negative");
                }

                Ok(WalOperation::UpsertRecord {
                    record: ComplianceRecord {
                        user_id,
                        torrent_id,
                        downloaded_at,
                        last_seeded_at,
                        total_seeding_time,
                        is_hit_and_run,
                    },
                })
            }
            _ => bail!("Unknown operation type"),
        }
    }
}

fn decode_passkey(hex_str: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(hex_str).context("Invalid passkey hex")?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("passkey must be 32 bytes"))
}

fn decode_info_hash(hex_str: &str) -> Result<[u8; 20]> {
    let bytes = hex::decode(hex_str).context("Invalid info_hash hex")?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("info_hash must be 20 bytes"))
}

/// Line-oriented write-ahead log.
///
/// Appends are flushed before returning so a logged operation survives a
/// crash. Compliance-record lines accumulate one per announce; `compact`
/// collapses the journal back to current state.
pub struct Wal {
    file: Mutex<File>,
    // Held shared by writers that journal an update and then commit it to
    // an in-memory store, exclusively by compaction. A snapshot therefore
    // never runs between such a writer's append and its commit.
    gate: RwLock<()>,
    path: PathBuf,
}

impl Wal {
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open WAL file")?;

        Ok(Wal {
            file: Mutex::new(file),
            gate: RwLock::new(()),
            path,
        })
    }

    /// Guard for a journal-then-commit sequence.
    ///
    /// Must be acquired before any store lock the sequence takes;
    /// compaction takes the gate exclusively before it snapshots, so it
    /// observes either the state from before the sequence (with the
    /// appended line still in the journal behind it) or the committed
    /// state.
    pub fn append_gate(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn log_operation(&self, op: &WalOperation) -> Result<()> {
        let line = op.serialize();
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("WAL mutex poisoned"))?;
        writeln!(file, "{}", line).context("Failed to write to WAL")?;
        file.flush().context("Failed to flush WAL")?;
        Ok(())
    }

    /// Read back every parseable operation, in write order.
    ///
    /// Malformed lines are skipped with a warning rather than aborting the
    /// whole replay, so one corrupt line cannot take the tracker down.
    pub fn replay(&self) -> Result<Vec<WalOperation>> {
        let file = File::open(&self.path).context("Failed to open WAL for replay")?;
        let reader = BufReader::new(file);
        let mut operations = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from WAL")?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match WalOperation::deserialize(line) {
                Ok(op) => operations.push(op),
                Err(e) => {
                    tracing::warn!(
                        line_num = line_num + 1,
                        error = %e,
                        "Failed to parse WAL line, skipping"
                    );
                }
            }
        }

        Ok(operations)
    }

    /// Atomically replace the journal with a snapshot of current state.
    ///
    /// The append gate and the file lock are both taken before `snapshot`
    /// runs and held through the truncate and rewrite: gated writers are
    /// either fully committed before the snapshot reads them or blocked
    /// until the compacted journal is in place, and plain appends land
    /// after it. Returns the number of operations written. `snapshot`
    /// must not log to the WAL.
    pub fn compact(&self, snapshot: impl FnOnce() -> Vec<WalOperation>) -> Result<usize> {
        let _gate = self.gate.write().unwrap_or_else(|e| e.into_inner());
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("WAL mutex poisoned"))?;

        let operations = snapshot();

        file.set_len(0).context("Failed to truncate WAL")?;
        for op in &operations {
            writeln!(file, "{}", op.serialize()).context("Failed to write to WAL")?;
        }
        file.flush().context("Failed to flush WAL after compaction")?;

        Ok(operations.len())
    }
}
