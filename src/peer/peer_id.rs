use rand::Rng as _;
use std::fmt;

// Azureus convention: '-' + two-letter client code + four version
// digits + '-', then a random tail.
const CLIENT_CODE: &str = "RS";
const CLIENT_VERSION: &str = "0001";

/// A 20-byte peer client identifier, learned from the handshake.
///
/// Carried for diagnostics only: peer identity throughout the crate is
/// the socket address, never the id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub [u8; 20]);

impl PeerId {
    /// Generates the local id: `-RS0001-` followed by a random tail.
    pub fn generate() -> Self {
        let mut id = [0u8; 20];
        id[0] = b'-';
        id[1..3].copy_from_slice(CLIENT_CODE.as_bytes());
        id[3..7].copy_from_slice(CLIENT_VERSION.as_bytes());
        id[7] = b'-';
        rand::rng().fill(&mut id[8..]);
        Self(id)
    }

    /// Builds an id from a 20-byte slice, `None` on any other length.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let id: [u8; 20] = bytes.try_into().ok()?;
        Some(Self(id))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Splits an Azureus-style id into its client code and version
    /// digits, e.g. `("qB", "4650")`. Ids that don't follow the
    /// convention (wrong markers, non-alphabetic code, non-numeric
    /// version) yield `None`.
    pub fn client(&self) -> Option<(&str, &str)> {
        if self.0[0] != b'-' || self.0[7] != b'-' {
            return None;
        }
        let code = std::str::from_utf8(&self.0[1..3]).ok()?;
        let version = std::str::from_utf8(&self.0[3..7]).ok()?;
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        if !version.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some((code, version))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.client() {
            Some((code, version)) => write!(f, "PeerId({}/{})", code, version),
            None => write!(f, "PeerId({:02x?})", &self.0[..8]),
        }
    }
}
