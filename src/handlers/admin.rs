use crate::core::error::AdminError;
use crate::core::startup::snapshot_operations;
use crate::core::state::AppState;
use crate::models::admin::{
    ApiKeyQuery, SuccessResponse, TorrentAddQuery, TorrentRemoveQuery, UserAddQuery,
    UserRemoveQuery,
};
use crate::models::torrent::Torrent;
use crate::models::user::User;
use crate::utils::auth::verify_api_key;
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

fn decode_info_hash(hex_str: &str) -> Result<[u8; 20], AdminError> {
    let bytes = hex::decode(hex_str).map_err(|e| AdminError::HexDecodeError(e.to_string()))?;

    let len = bytes.len();
    bytes.try_into().map_err(|_| AdminError::InvalidLength {
        expected: 20,
        actual: len,
    })
}

fn decode_passkey(passkey: &str) -> Result<[u8; 32], AdminError> {
    let bytes = passkey.as_bytes();

    if bytes.len() != 32 {
        return Err(AdminError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        });
    }

    if !bytes.iter().all(|&b| b.is_ascii_alphanumeric()) {
        return Err(AdminError::InvalidParameter(
            "Passkey must be alphanumeric".to_string(),
        ));
    }

    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn success(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Register a torrent
///
/// GET /torrent/add?api_key=<key>&id=<id>&info_hash=<hex>
pub async fn torrent_add_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TorrentAddQuery>,
) -> Result<Response, AdminError> {
    if !verify_api_key(&params.api_key, &state.config.api.api_key) {
        warn!("Unauthorized torrent add attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let info_hash = decode_info_hash(&params.info_hash)?;

    state
        .torrent_cache
        .add_torrent(Torrent::new(params.id, info_hash, true));

    if let Err(e) = state.wal.log_operation(&WalOperation::AddTorrent {
        id: params.id,
        info_hash,
    }) {
        warn!(error = %e, "Failed to log torrent add to WAL");
        // Cache is already updated; the entry just won't survive a restart
    }

    info!(torrent_id = params.id, info_hash = %params.info_hash, "Torrent added");

    Ok(success("Torrent added successfully"))
}

/// Remove a torrent
///
/// GET /torrent/remove?api_key=<key>&info_hash=<hex>
pub async fn torrent_remove_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TorrentRemoveQuery>,
) -> Result<Response, AdminError> {
    if !verify_api_key(&params.api_key, &state.config.api.api_key) {
        warn!("Unauthorized torrent remove attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let info_hash = decode_info_hash(&params.info_hash)?;

    state
        .torrent_cache
        .remove_torrent(info_hash)
        .ok_or_else(|| AdminError::NotFound("Torrent not in cache".to_string()))?;

    if let Err(e) = state
        .wal
        .log_operation(&WalOperation::RemoveTorrent { info_hash })
    {
        warn!(error = %e, "Failed to log torrent remove to WAL");
    }

    info!(info_hash = %params.info_hash, "Torrent removed");

    Ok(success("Torrent removed successfully"))
}

/// Register a user account
///
/// GET /user/add?api_key=<key>&id=<id>&passkey=<32 chars>
pub async fn user_add_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserAddQuery>,
) -> Result<Response, AdminError> {
    if !verify_api_key(&params.api_key, &state.config.api.api_key) {
        warn!("Unauthorized user add attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let passkey = decode_passkey(&params.passkey)?;

    state.user_cache.add_user(User::new(params.id, passkey, true));

    if let Err(e) = state.wal.log_operation(&WalOperation::AddUser {
        id: params.id,
        passkey,
    }) {
        warn!(error = %e, "Failed to log user add to WAL");
    }

    info!(user_id = params.id, "User added");

    Ok(success("User added successfully"))
}

/// Remove a user account
///
/// GET /user/remove?api_key=<key>&passkey=<32 chars>
pub async fn user_remove_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserRemoveQuery>,
) -> Result<Response, AdminError> {
    if !verify_api_key(&params.api_key, &state.config.api.api_key) {
        warn!("Unauthorized user remove attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let passkey = decode_passkey(&params.passkey)?;

    state
        .user_cache
        .remove_user(passkey)
        .ok_or_else(|| AdminError::NotFound("User not in cache".to_string()))?;

    if let Err(e) = state
        .wal
        .log_operation(&WalOperation::RemoveUser { passkey })
    {
        warn!(error = %e, "Failed to log user remove to WAL");
    }

    info!("User removed");

    Ok(success("User removed successfully"))
}

/// Rewrite the WAL from current in-memory state
///
/// POST /wal/compact?api_key=<key>
///
/// Announce traffic appends one record line per evaluation; compaction
/// collapses the journal back to one line per entity.
pub async fn wal_compact_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
) -> Result<Response, AdminError> {
    if !verify_api_key(&params.api_key, &state.config.api.api_key) {
        warn!("Unauthorized WAL compact attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let operations = state
        .wal
        .compact(|| snapshot_operations(&state))
        .map_err(|e| AdminError::WalError(e.to_string()))?;

    info!(operations = operations, "WAL compacted");

    Ok(success("WAL compacted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::wal::wal::Wal;
    use tempfile::TempDir;

    const HASH_HEX: &str = "0101010101010101010101010101010101010101";
    const PASSKEY: &str = "abcdef0123456789abcdef0123456789";

    fn create_test_state() -> (Arc<AppState>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let wal = Wal::new(temp_dir.path().join("test.wal")).unwrap();
        let mut config = Config::default();
        config.api.api_key = "test-api-key".to_string();
        (Arc::new(AppState::new(config, wal)), temp_dir)
    }

    #[tokio::test]
    async fn test_torrent_add_and_remove() {
        let (state, _dir) = create_test_state();

        torrent_add_handler(
            State(Arc::clone(&state)),
            Query(TorrentAddQuery {
                api_key: "test-api-key".to_string(),
                id: 5,
                info_hash: HASH_HEX.to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(state.torrent_cache.len(), 1);

        torrent_remove_handler(
            State(Arc::clone(&state)),
            Query(TorrentRemoveQuery {
                api_key: "test-api-key".to_string(),
                info_hash: HASH_HEX.to_string(),
            }),
        )
        .await
        .unwrap();

        assert!(state.torrent_cache.is_empty());
        assert_eq!(state.wal.replay().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_torrent_add_bad_hash() {
        let (state, _dir) = create_test_state();

        let result = torrent_add_handler(
            State(state),
            Query(TorrentAddQuery {
                api_key: "test-api-key".to_string(),
                id: 5,
                info_hash: "zzzz".to_string(),
            }),
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_add_and_remove() {
        let (state, _dir) = create_test_state();

        user_add_handler(
            State(Arc::clone(&state)),
            Query(UserAddQuery {
                api_key: "test-api-key".to_string(),
                id: 9,
                passkey: PASSKEY.to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(state.user_cache.len(), 1);

        user_remove_handler(
            State(Arc::clone(&state)),
            Query(UserRemoveQuery {
                api_key: "test-api-key".to_string(),
                passkey: PASSKEY.to_string(),
            }),
        )
        .await
        .unwrap();

        assert!(state.user_cache.is_empty());
    }

    #[tokio::test]
    async fn test_user_add_invalid_passkey() {
        let (state, _dir) = create_test_state();

        let result = user_add_handler(
            State(state),
            Query(UserAddQuery {
                api_key: "test-api-key".to_string(),
                id: 9,
                passkey: "short".to_string(),
            }),
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wal_compact() {
        let (state, _dir) = create_test_state();

        // Two adds plus a remove leaves one live entity but three lines
        for _ in 0..2 {
            torrent_add_handler(
                State(Arc::clone(&state)),
                Query(TorrentAddQuery {
                    api_key: "test-api-key".to_string(),
                    id: 5,
                    info_hash: HASH_HEX.to_string(),
                }),
            )
            .await
            .unwrap();
        }

        wal_compact_handler(
            State(Arc::clone(&state)),
            Query(ApiKeyQuery {
                api_key: "test-api-key".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(state.wal.replay().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_requires_api_key() {
        let (state, _dir) = create_test_state();

        let result = torrent_add_handler(
            State(state),
            Query(TorrentAddQuery {
                api_key: "wrong".to_string(),
                id: 5,
                info_hash: HASH_HEX.to_string(),
            }),
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
