// Centralized error handling for the tracker

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures of the seeding-compliance evaluation.
///
/// The evaluation itself cannot fail on valid typed input; what can fail is
/// persisting the updated record. That failure is never swallowed, since a
/// silently dropped update corrupts the compliance accounting.
#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Failed to persist compliance record: {0}")]
    Persistence(#[source] anyhow::Error),
}

/// Errors that can occur during announce processing
#[derive(Error, Debug)]
pub enum AnnounceError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("This is a BitTorrent tracker announce URL, not meant to be opened in a web browser. Add it to your torrent client as the tracker for your torrent."
    )]
    BrowserAccess,

    #[error("Invalid passkey provided")]
    InvalidPasskey,

    #[error("User account is disabled")]
    UserDisabled,

    #[error("Torrent not registered")]
    TorrentNotFound,

    #[error("Torrent is not active")]
    TorrentInactive,

    #[error("Failed to record seeding compliance")]
    Compliance(#[from] ComplianceError),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl IntoResponse for AnnounceError {
    fn into_response(self) -> Response {
        // Browser requests get plain text instead of bencode
        if matches!(self, AnnounceError::BrowserAccess) {
            return Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "text/plain; charset=utf-8")
                .body("Nothing to see here".to_string().into())
                .unwrap();
        }

        // Torrent clients expect failures as a bencoded dictionary:
        // d14:failure reason<len>:<message>e
        use crate::bencode::encoder::BencodeEncode;

        let message = self.to_string();
        let mut buf = Vec::with_capacity(128);

        buf.extend_from_slice(b"d");
        "failure reason".bencode(&mut buf);
        message.as_str().bencode(&mut buf);
        buf.extend_from_slice(b"e");

        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .body(buf.into())
            .unwrap()
    }
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to parse hex: {0}")]
    HexDecodeError(String),

    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Failed to write to WAL: {0}")]
    WalError(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        use crate::models::admin::ErrorResponse;
        use axum::response::Json;

        let status = match &self {
            AdminError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AdminError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::HexDecodeError(_) => StatusCode::BAD_REQUEST,
            AdminError::InvalidLength { .. } => StatusCode::BAD_REQUEST,
            AdminError::WalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Invalid API key")]
    InvalidApiKey,
}

impl IntoResponse for MonitoringError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MonitoringError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Unauthorized"),
        };

        (status, message).into_response()
    }
}
