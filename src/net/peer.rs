use crate::peer::PeerId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

/// Identity of one remote participant on one transport connection.
///
/// The socket address is the stable identity: equality and hashing use
/// the address alone, so a `Peer` keeps working as a map key whether or
/// not a [`PeerId`] has been learned from the handshake yet.
#[derive(Clone)]
pub struct Peer {
    addr: SocketAddr,
    peer_id: Option<PeerId>,
}

impl Peer {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            peer_id: None,
        }
    }

    pub fn with_peer_id(addr: SocketAddr, peer_id: PeerId) -> Self {
        Self {
            addr,
            peer_id: Some(peer_id),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn peer_id(&self) -> Option<&PeerId> {
        self.peer_id.as_ref()
    }
}

impl PartialEq for Peer {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for Peer {}

impl Hash for Peer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.peer_id {
            Some(peer_id) => write!(f, "Peer({}, {:?})", self.addr, peer_id),
            None => write!(f, "Peer({})", self.addr),
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr)
    }
}
