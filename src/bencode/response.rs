use super::encoder::BencodeEncode;
use crate::models::peer::Peer;
use std::net::IpAddr;

/// Build a bencoded announce response.
///
/// Compact mode packs IPv4 peers into 6-byte entries under `peers` and IPv6
/// peers into 18-byte entries under `peers6`; dictionary mode lists peers
/// with explicit `ip`/`peer id`/`port` keys.
pub fn build_announce_response(
    peers: &[Peer],
    seeders: u32,
    leechers: u32,
    interval: i64,
    min_interval: i64,
    compact: bool,
) -> Vec<u8> {
    let capacity = if compact {
        100 + peers.len() * 6
    } else {
        100 + peers.len() * 50
    };
    let mut buf = Vec::with_capacity(capacity);

    buf.push(b'd');

    "complete".bencode(&mut buf);
    (seeders as i64).bencode(&mut buf);

    "incomplete".bencode(&mut buf);
    (leechers as i64).bencode(&mut buf);

    "interval".bencode(&mut buf);
    interval.bencode(&mut buf);

    "min interval".bencode(&mut buf);
    min_interval.bencode(&mut buf);

    if compact {
        "peers".bencode(&mut buf);
        encode_compact_peers_v4(peers, &mut buf);

        "peers6".bencode(&mut buf);
        encode_compact_peers_v6(peers, &mut buf);
    } else {
        "peers".bencode(&mut buf);
        encode_dict_peers(peers, &mut buf);
    }

    buf.push(b'e');

    buf
}

fn encode_compact_peers_v4(peers: &[Peer], buf: &mut Vec<u8>) {
    let addrs: Vec<([u8; 4], u16)> = peers
        .iter()
        .filter_map(|peer| match peer.ip {
            IpAddr::V4(ip) => Some((ip.octets(), peer.port)),
            IpAddr::V6(_) => None,
        })
        .collect();

    let mut itoa_buf = itoa::Buffer::new();
    buf.extend_from_slice(itoa_buf.format(addrs.len() * 6).as_bytes());
    buf.push(b':');

    for (octets, port) in addrs {
        buf.extend_from_slice(&octets);
        buf.extend_from_slice(&port.to_be_bytes());
    }
}

fn encode_compact_peers_v6(peers: &[Peer], buf: &mut Vec<u8>) {
    let addrs: Vec<([u8; 16], u16)> = peers
        .iter()
        .filter_map(|peer| match peer.ip {
            IpAddr::V6(ip) => Some((ip.octets(), peer.port)),
            IpAddr::V4(_) => None,
        })
        .collect();

    let mut itoa_buf = itoa::Buffer::new();
    buf.extend_from_slice(itoa_buf.format(addrs.len() * 18).as_bytes());
    buf.push(b':');

    for (octets, port) in addrs {
        buf.extend_from_slice(&octets);
        buf.extend_from_slice(&port.to_be_bytes());
    }
}

fn encode_dict_peers(peers: &[Peer], buf: &mut Vec<u8>) {
    buf.push(b'l');

    for peer in peers {
        buf.push(b'd');

        "ip".bencode(buf);
        peer.ip.to_string().as_str().bencode(buf);

        "peer id".bencode(buf);
        peer.peer_id.as_slice().bencode(buf);

        "port".bencode(buf);
        (peer.port as i64).bencode(buf);

        buf.push(b'e');
    }

    buf.push(b'e');
}
