/// Append-only bencode encoding into a shared buffer.
pub trait BencodeEncode {
    fn bencode(&self, buf: &mut Vec<u8>);
}

impl BencodeEncode for i64 {
    fn bencode(&self, buf: &mut Vec<u8>) {
        buf.push(b'i');
        let mut itoa_buf = itoa::Buffer::new();
        buf.extend_from_slice(itoa_buf.format(*self).as_bytes());
        buf.push(b'e');
    }
}

impl BencodeEncode for &[u8] {
    fn bencode(&self, buf: &mut Vec<u8>) {
        let mut itoa_buf = itoa::Buffer::new();
        buf.extend_from_slice(itoa_buf.format(self.len()).as_bytes());
        buf.push(b':');
        buf.extend_from_slice(self);
    }
}

impl BencodeEncode for &str {
    fn bencode(&self, buf: &mut Vec<u8>) {
        self.as_bytes().bencode(buf);
    }
}
