/// A tracker account, keyed by its announce passkey.
#[derive(Clone, Debug)]
pub struct User {
    /// User ID
    pub id: u32,
    /// 32-character alphanumeric passkey as raw bytes
    pub passkey: [u8; 32],
    /// Disabled accounts are rejected at announce time
    pub is_active: bool,
}

impl User {
    pub fn new(id: u32, passkey: [u8; 32], is_active: bool) -> Self {
        Self {
            id,
            passkey,
            is_active,
        }
    }
}
