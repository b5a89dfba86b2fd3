use crate::utils::hex::url_decode;
use anyhow::{anyhow, bail, Context, Result};
use std::net::IpAddr;

/// Raw announce query parameters, as sent by the client.
#[derive(Debug, Default)]
pub struct AnnounceParams {
    /// User's 32-character alphanumeric passkey
    pub passkey: String,
    /// URL-encoded 20-byte info_hash
    pub info_hash: String,
    /// URL-encoded 20-byte peer_id
    pub peer_id: String,
    /// Port number (1-65535)
    pub port: u16,
    /// Bytes uploaded this session
    pub uploaded: u64,
    /// Bytes downloaded this session
    pub downloaded: u64,
    /// Bytes left to download (0 means seeding)
    pub left: u64,
    /// Event: "started", "stopped", "completed", or empty
    pub event: String,
    /// Number of peers wanted (0-200)
    pub numwant: u32,
    /// Compact mode (0 or 1)
    pub compact: u8,
    /// Optional IP address override
    pub ip: Option<String>,
}

/// Announce parameters after validation, with binary fields decoded.
#[derive(Debug)]
pub struct ValidatedAnnounceParams {
    pub passkey: [u8; 32],
    pub info_hash: [u8; 20],
    pub peer_id: [u8; 20],
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub event: Option<AnnounceEvent>,
    pub numwant: u32,
    pub compact: bool,
    pub ip: Option<IpAddr>,
}

/// The closed set of announce lifecycle events.
///
/// Anything outside this set is rejected at validation time rather than
/// silently treated as a regular announce; an absent event is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceEvent {
    Started,
    Stopped,
    Completed,
}

impl AnnounceParams {
    pub fn validate(self) -> Result<ValidatedAnnounceParams> {
        let passkey = self.validate_passkey().context("Invalid passkey")?;
        let info_hash = self.validate_info_hash().context("Invalid info_hash")?;
        let peer_id = self.validate_peer_id().context("Invalid peer_id")?;
        let port = self.validate_port().context("Invalid port")?;
        let numwant = self.validate_numwant().context("Invalid numwant")?;
        let event = self.validate_event().context("Invalid event")?;

        let compact = self.compact == 1;

        let ip = match self.ip {
            Some(ip_str) => Some(ip_str.parse::<IpAddr>().context("Invalid IP address")?),
            None => None,
        };

        Ok(ValidatedAnnounceParams {
            passkey,
            info_hash,
            peer_id,
            port,
            uploaded: self.uploaded,
            downloaded: self.downloaded,
            left: self.left,
            event,
            numwant,
            compact,
            ip,
        })
    }

    fn validate_passkey(&self) -> Result<[u8; 32]> {
        let bytes = self.passkey.as_bytes();

        if bytes.len() != 32 {
            bail!("Passkey must be exactly 32 characters");
        }

        if !bytes.iter().all(|&b| b.is_ascii_alphanumeric()) {
            bail!("Passkey must contain only alphanumeric characters");
        }

        let mut passkey = [0u8; 32];
        passkey.copy_from_slice(bytes);

        Ok(passkey)
    }

    fn validate_info_hash(&self) -> Result<[u8; 20]> {
        let bytes = url_decode(&self.info_hash).context("Failed to URL decode info_hash")?;

        bytes
            .try_into()
            .map_err(|_| anyhow!("Info hash must be exactly 20 bytes"))
    }

    fn validate_peer_id(&self) -> Result<[u8; 20]> {
        let bytes = url_decode(&self.peer_id).context("Failed to URL decode peer_id")?;

        bytes
            .try_into()
            .map_err(|_| anyhow!("Peer ID must be exactly 20 bytes"))
    }

    fn validate_port(&self) -> Result<u16> {
        if self.port == 0 {
            bail!("Port must be between 1 and 65535");
        }

        // Ports tied to other P2P software or services a peer should not
        // be listening on
        const BLACKLISTED_PORTS: &[u16] = &[
            8080, 8081, // HTTP proxies
            1214,       // Kazaa
            3389,       // Windows Remote Desktop
            4662,       // eDonkey 2000
            6346, 6347, // Gnutella
            6699,       // WinMX, Napster
        ];

        if BLACKLISTED_PORTS.contains(&self.port) {
            bail!("Port is blacklisted");
        }

        Ok(self.port)
    }

    fn validate_numwant(&self) -> Result<u32> {
        if self.numwant > 200 {
            bail!("Numwant must be between 0 and 200");
        }

        Ok(self.numwant)
    }

    fn validate_event(&self) -> Result<Option<AnnounceEvent>> {
        if self.event.is_empty() {
            return Ok(None);
        }

        match self.event.as_str() {
            "started" => Ok(Some(AnnounceEvent::Started)),
            "stopped" => Ok(Some(AnnounceEvent::Stopped)),
            "completed" => Ok(Some(AnnounceEvent::Completed)),
            _ => bail!("Event must be 'started', 'stopped', 'completed', or empty"),
        }
    }
}
