use super::connection::PeerConnection;
use super::peer::Peer;
use crate::metainfo::TorrentId;
use dashmap::DashMap;
use std::sync::Arc;

/// Keeps the established connections, keyed by peer identity.
///
/// Lookups are safe from any thread. The dispatcher resolves peers
/// through [`get_connection`](Self::get_connection) on every iteration,
/// so a connection becomes invisible to messaging as soon as it is no
/// longer in the pool.
pub struct PeerConnectionPool {
    connections: DashMap<Peer, Arc<dyn PeerConnection>>,
}

impl PeerConnectionPool {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Connection for the given peer, if one is established.
    pub fn get_connection(&self, peer: &Peer) -> Option<Arc<dyn PeerConnection>> {
        self.connections.get(peer).map(|entry| entry.value().clone())
    }

    /// Adds a connection unless one already exists for the same peer.
    ///
    /// Returns the connection that is in the pool afterwards: the new
    /// one, or the existing one on collision.
    pub fn add_connection_if_absent(
        &self,
        connection: Arc<dyn PeerConnection>,
    ) -> Arc<dyn PeerConnection> {
        let peer = connection.peer().clone();
        self.connections
            .entry(peer)
            .or_insert(connection)
            .value()
            .clone()
    }

    /// Visits every connection established for the given torrent.
    pub fn visit_connections<F>(&self, torrent_id: TorrentId, mut visitor: F)
    where
        F: FnMut(&Arc<dyn PeerConnection>),
    {
        for entry in self.connections.iter() {
            if entry.value().torrent_id() == torrent_id {
                visitor(entry.value());
            }
        }
    }

    /// Number of established connections.
    pub fn size(&self) -> usize {
        self.connections.len()
    }
}

impl Default for PeerConnectionPool {
    fn default() -> Self {
        Self::new()
    }
}
