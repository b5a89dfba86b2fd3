use crate::bencode::response::build_announce_response;
use crate::core::error::AnnounceError;
use crate::core::state::AppState;
use crate::models::peer::Peer;
use crate::utils::time::{current_timestamp, current_timestamp_millis};
use crate::validation::params::{AnnounceEvent, AnnounceParams};
use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Main announce handler
///
/// # Flow
/// 1. Parse and validate query parameters
/// 2. Authenticate user (passkey) and authorize torrent (info_hash)
/// 3. Evaluate seeding compliance for this (user, torrent) pair
/// 4. Update the peer store (stopped removes the peer)
/// 5. Build and return the bencoded peer list
#[instrument(skip(state, raw_query))]
pub async fn announce_handler(
    State(state): State<Arc<AppState>>,
    axum::extract::RawQuery(raw_query): axum::extract::RawQuery,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AnnounceError> {
    let query_str = raw_query.ok_or_else(|| {
        warn!("Missing query string - browser access");
        state.metrics.increment_failed();
        AnnounceError::BrowserAccess
    })?;

    let mut params = AnnounceParams {
        numwant: 50,
        compact: 1,
        ..Default::default()
    };

    for pair in query_str.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            match key {
                "passkey" => params.passkey = value.to_string(),
                "info_hash" => params.info_hash = value.to_string(),
                "peer_id" => params.peer_id = value.to_string(),
                "port" => params.port = value.parse().unwrap_or(0),
                "uploaded" => params.uploaded = value.parse().unwrap_or(0),
                "downloaded" => params.downloaded = value.parse().unwrap_or(0),
                // left feeds the compliance accounting, where 0 means
                // seeding; a malformed value must fail rather than be
                // coerced into a seeding announce
                "left" => {
                    params.left = value.parse().map_err(|_| {
                        warn!(left = %value, "Rejecting announce with malformed left");
                        state.metrics.increment_failed();
                        AnnounceError::InvalidParameter(
                            "left must be a non-negative integer".to_string(),
                        )
                    })?
                }
                "event" => params.event = value.to_string(),
                "numwant" => params.numwant = value.parse().unwrap_or(50),
                "compact" => params.compact = value.parse().unwrap_or(1),
                "ip" => params.ip = Some(value.to_string()),
                _ => {}
            }
        }
    }

    if !params.passkey.is_empty() && params.info_hash.is_empty() && params.peer_id.is_empty() {
        warn!("Browser access detected: only passkey provided");
        state.metrics.increment_failed();
        return Err(AnnounceError::BrowserAccess);
    }

    state.metrics.increment_announces();

    let validated = params.validate().map_err(|e| {
        warn!(error = %e, "Parameter validation failed");
        state.metrics.increment_failed();
        AnnounceError::InvalidParameter("Invalid announce parameters".to_string())
    })?;

    let ip = validated.ip.unwrap_or(addr.ip());

    debug!(
        ip = %ip,
        port = validated.port,
        left = validated.left,
        event = ?validated.event,
        "Validated announce parameters"
    );

    let user = state
        .user_cache
        .get_user(validated.passkey)
        .ok_or_else(|| {
            warn!("Invalid passkey");
            state.metrics.increment_failed();
            AnnounceError::InvalidPasskey
        })?;

    if !user.is_active {
        warn!(user_id = user.id, "User account is disabled");
        state.metrics.increment_failed();
        return Err(AnnounceError::UserDisabled);
    }

    let torrent = state
        .torrent_cache
        .get_torrent(validated.info_hash)
        .ok_or_else(|| {
            warn!("Torrent not registered");
            state.metrics.increment_failed();
            AnnounceError::TorrentNotFound
        })?;

    if !torrent.is_active {
        warn!(torrent_id = torrent.id, "Torrent is not active");
        state.metrics.increment_failed();
        return Err(AnnounceError::TorrentInactive);
    }

    debug!(user_id = user.id, torrent_id = torrent.id, "Announce authorized");

    // Compliance evaluation runs on every announce, including stops, so the
    // final seeding interval is credited before the hit-and-run check.
    let now_ms = current_timestamp_millis();
    let required_minutes = state.required_seeding_minutes.load(Ordering::Relaxed);

    let record = state
        .compliance
        .evaluate(
            user.id,
            torrent.id,
            validated.left,
            validated.event,
            now_ms,
            required_minutes,
        )
        .map_err(|e| {
            warn!(
                user_id = user.id,
                torrent_id = torrent.id,
                error = %e,
                "Compliance evaluation failed"
            );
            state.metrics.increment_failed();
            AnnounceError::Compliance(e)
        })?;

    if record.is_hit_and_run {
        debug!(
            user_id = user.id,
            torrent_id = torrent.id,
            total_seeding_time = record.total_seeding_time,
            "Pair is flagged as hit-and-run"
        );
    }

    let current_time = current_timestamp();

    match validated.event {
        Some(AnnounceEvent::Stopped) => {
            if state
                .peer_store
                .remove_peer(validated.info_hash, validated.peer_id)
                .is_some()
            {
                info!(
                    user_id = user.id,
                    torrent_id = torrent.id,
                    "Peer stopped and removed"
                );
            }

            let (seeders, leechers) = state.peer_store.get_stats(validated.info_hash);
            let response = build_announce_response(
                &[],
                seeders,
                leechers,
                state.config.tracker.announce_interval,
                state.config.tracker.min_announce_interval,
                validated.compact,
            );

            state.metrics.increment_successful();
            return Ok(bencode_response(response));
        }
        Some(AnnounceEvent::Started) => {
            info!(user_id = user.id, torrent_id = torrent.id, "Peer started");
        }
        Some(AnnounceEvent::Completed) => {
            info!(
                user_id = user.id,
                torrent_id = torrent.id,
                "Peer completed download"
            );
        }
        None => {}
    }

    let peer = Peer::new(
        user.id,
        torrent.id,
        validated.peer_id,
        ip,
        validated.port,
        validated.left,
        current_time,
    );

    state.peer_store.upsert_peer(validated.info_hash, peer);

    let peers = state
        .peer_store
        .get_peers(validated.info_hash, validated.numwant, validated.peer_id);
    let (seeders, leechers) = state.peer_store.get_stats(validated.info_hash);

    debug!(
        seeders = seeders,
        leechers = leechers,
        peers_returned = peers.len(),
        "Building announce response"
    );

    let response = build_announce_response(
        &peers,
        seeders,
        leechers,
        state.config.tracker.announce_interval,
        state.config.tracker.min_announce_interval,
        validated.compact,
    );

    state.metrics.increment_successful();

    Ok(bencode_response(response))
}

fn bencode_response(body: Vec<u8>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain")
        .body(body.into())
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::models::torrent::Torrent;
    use crate::models::user::User;
    use crate::wal::wal::Wal;
    use std::net::{IpAddr, Ipv4Addr};
    use tempfile::TempDir;

    const PASSKEY: &str = "abcdef0123456789abcdef0123456789";

    fn create_test_state() -> (Arc<AppState>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let wal = Wal::new(temp_dir.path().join("test.wal")).unwrap();
        let mut config = Config::default();
        config.api.api_key = "test-api-key".to_string();
        let state = AppState::new(config, wal);

        let mut passkey = [0u8; 32];
        passkey.copy_from_slice(PASSKEY.as_bytes());
        state.user_cache.add_user(User::new(1, passkey, true));
        state
            .torrent_cache
            .add_torrent(Torrent::new(2, [1u8; 20], true));

        (Arc::new(state), temp_dir)
    }

    fn query(left: &str) -> String {
        let info_hash = "%01".repeat(20);
        let peer_id = "%02".repeat(20);
        format!(
            "passkey={}&info_hash={}&peer_id={}&port=6881&uploaded=0&downloaded=0&left={}",
            PASSKEY, info_hash, peer_id, left
        )
    }

    async fn announce(state: Arc<AppState>, left: &str) -> Result<Response, AnnounceError> {
        announce_handler(
            State(state),
            axum::extract::RawQuery(Some(query(left))),
            ConnectInfo(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 50000)),
        )
        .await
    }

    #[tokio::test]
    async fn test_seeding_announce_starts_compliance_clock() {
        let (state, _dir) = create_test_state();

        let response = announce(Arc::clone(&state), "0").await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let record = state.compliance_store.get(1, 2).unwrap();
        assert!(record.last_seeded_at.is_some());
        assert_eq!(state.peer_store.total_peers(), 1);
    }

    #[tokio::test]
    async fn test_leeching_announce_leaves_clock_unset() {
        let (state, _dir) = create_test_state();

        announce(Arc::clone(&state), "1000").await.unwrap();

        let record = state.compliance_store.get(1, 2).unwrap();
        assert_eq!(record.last_seeded_at, None);
    }

    #[tokio::test]
    async fn test_malformed_left_rejected_not_coerced() {
        let (state, _dir) = create_test_state();

        for left in ["-1", "abc", ""] {
            let result = announce(Arc::clone(&state), left).await;
            assert!(
                matches!(result, Err(AnnounceError::InvalidParameter(_))),
                "left={} must be rejected",
                left
            );
        }

        // A value that never parsed must not start the seeding clock or
        // touch the swarm
        assert!(state.compliance_store.get(1, 2).is_none());
        assert_eq!(state.peer_store.total_peers(), 0);
    }

    #[tokio::test]
    async fn test_unknown_passkey_rejected() {
        let (state, _dir) = create_test_state();

        let bad_query = query("0").replace(PASSKEY, "00000000000000000000000000000000");
        let result = announce_handler(
            State(Arc::clone(&state)),
            axum::extract::RawQuery(Some(bad_query)),
            ConnectInfo(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 50000)),
        )
        .await;

        assert!(matches!(result, Err(AnnounceError::InvalidPasskey)));
        assert!(state.compliance_store.get(1, 2).is_none());
    }
}
