use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct TorrentAddQuery {
    pub api_key: String,
    pub id: u32,
    pub info_hash: String,
}

#[derive(Deserialize)]
pub struct TorrentRemoveQuery {
    pub api_key: String,
    pub info_hash: String,
}

#[derive(Deserialize)]
pub struct UserAddQuery {
    pub api_key: String,
    pub id: u32,
    pub passkey: String,
}

#[derive(Deserialize)]
pub struct UserRemoveQuery {
    pub api_key: String,
    pub passkey: String,
}

#[derive(Deserialize)]
pub struct CompliancePairQuery {
    pub api_key: String,
    pub user_id: u32,
    pub torrent_id: u32,
}

#[derive(Deserialize)]
pub struct ComplianceListQuery {
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct ThresholdQuery {
    pub api_key: String,
    pub minutes: u64,
}

#[derive(Deserialize)]
pub struct ApiKeyQuery {
    pub api_key: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub success: bool,
    pub record: crate::models::compliance::ComplianceRecord,
}

#[derive(Serialize)]
pub struct RecordListResponse {
    pub success: bool,
    pub records: Vec<crate::models::compliance::ComplianceRecord>,
}
