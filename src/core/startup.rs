use crate::core::state::AppState;
use crate::models::{torrent::Torrent, user::User};
use crate::wal::wal::WalOperation;
use anyhow::Result;

/// Apply replayed WAL operations to the in-memory stores at boot.
///
/// Operations apply in write order, so the last record line per
/// (user, torrent) pair wins and removals undo earlier additions.
pub fn apply_wal_operations(state: &AppState, operations: &[WalOperation]) -> Result<()> {
    for op in operations {
        match op {
            WalOperation::AddUser { id, passkey } => {
                state.user_cache.add_user(User::new(*id, *passkey, true));
            }
            WalOperation::RemoveUser { passkey } => {
                state.user_cache.remove_user(*passkey);
            }
            WalOperation::AddTorrent { id, info_hash } => {
                state
                    .torrent_cache
                    .add_torrent(Torrent::new(*id, *info_hash, true));
            }
            WalOperation::RemoveTorrent { info_hash } => {
                state.torrent_cache.remove_torrent(*info_hash);
            }
            WalOperation::UpsertRecord { record } => {
                state.compliance_store.insert(record.clone());
            }
        }
    }
    Ok(())
}

/// Build the operation list representing current state, for WAL compaction.
pub fn snapshot_operations(state: &AppState) -> Vec<WalOperation> {
    let mut operations = Vec::new();

    for user in state.user_cache.all_users() {
        operations.push(WalOperation::AddUser {
            id: user.id,
            passkey: user.passkey,
        });
    }

    for torrent in state.torrent_cache.all_torrents() {
        operations.push(WalOperation::AddTorrent {
            id: torrent.id,
            info_hash: torrent.info_hash,
        });
    }

    for record in state.compliance_store.all_records() {
        operations.push(WalOperation::UpsertRecord { record });
    }

    operations
}
