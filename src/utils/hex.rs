use anyhow::{Context, Result};

/// Decode a percent-encoded query value into raw bytes.
///
/// BitTorrent clients send info_hash and peer_id as percent-encoded binary,
/// so this works on bytes rather than UTF-8 text. '+' decodes to a space.
pub fn url_decode(encoded: &str) -> Result<Vec<u8>> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .context("Incomplete percent-encoding")?;
                let hex = std::str::from_utf8(hex)
                    .context("Non-ASCII bytes in percent-encoding")?;
                let byte = u8::from_str_radix(hex, 16)
                    .context("Invalid hex digits in percent-encoding")?;
                decoded.push(byte);
                i += 3;
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            b => {
                decoded.push(b);
                i += 1;
            }
        }
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_decode_plain() {
        assert_eq!(url_decode("hello").unwrap(), b"hello");
    }

    #[test]
    fn test_url_decode_percent() {
        assert_eq!(url_decode("%48%65%6c%6c%6f").unwrap(), b"Hello");
        assert_eq!(url_decode("hello%20world").unwrap(), b"hello world");
    }

    #[test]
    fn test_url_decode_plus_as_space() {
        assert_eq!(url_decode("hello+world").unwrap(), b"hello world");
    }

    #[test]
    fn test_url_decode_binary() {
        assert_eq!(
            url_decode("%de%ad%be%ef").unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn test_url_decode_invalid() {
        // Truncated escape
        assert!(url_decode("%4").is_err());
        assert!(url_decode("abc%").is_err());
        // Bad hex digits
        assert!(url_decode("%zz").is_err());
    }
}
