use super::session::Amounts;
use crate::net::Peer;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running transfer counters for one connected peer.
///
/// The counters only grow while the peer stays connected; a reconnect
/// gets a fresh `ConnectionState`, and [`super::SessionState`] keeps the
/// old session's contribution on the disconnected side of its ledger.
pub struct ConnectionState {
    downloaded: AtomicU64,
    uploaded: AtomicU64,
}

impl ConnectionState {
    fn new() -> Self {
        Self {
            downloaded: AtomicU64::new(0),
            uploaded: AtomicU64::new(0),
        }
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded.load(Ordering::Relaxed)
    }

    pub fn uploaded(&self) -> u64 {
        self.uploaded.load(Ordering::Relaxed)
    }

    pub fn add_downloaded(&self, bytes: u64) {
        self.downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_uploaded(&self, bytes: u64) {
        self.uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Samples both counters at one instant.
    pub fn amounts(&self) -> Amounts {
        Amounts {
            downloaded: self.downloaded(),
            uploaded: self.uploaded(),
        }
    }
}

/// Tracks the peers currently exchanging data for one torrent.
///
/// Readable from any thread; the session-state aggregator samples
/// [`peers`](Self::peers) and [`connection_state`](Self::connection_state)
/// concurrently with the messaging side adding and removing peers.
pub struct TorrentWorker {
    peers: DashMap<Peer, Arc<ConnectionState>>,
}

impl TorrentWorker {
    pub fn new() -> Self {
        Self {
            peers: DashMap::new(),
        }
    }

    /// Starts tracking a peer, returning its fresh connection state.
    /// Re-adding a connected peer keeps the existing state.
    pub fn add_peer(&self, peer: Peer) -> Arc<ConnectionState> {
        self.peers
            .entry(peer)
            .or_insert_with(|| Arc::new(ConnectionState::new()))
            .value()
            .clone()
    }

    /// Stops tracking a peer, dropping its connection state.
    pub fn remove_peer(&self, peer: &Peer) {
        self.peers.remove(peer);
    }

    /// Snapshot of the currently connected peers.
    pub fn peers(&self) -> HashSet<Peer> {
        self.peers.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn connection_state(&self, peer: &Peer) -> Option<Arc<ConnectionState>> {
        self.peers.get(peer).map(|entry| entry.value().clone())
    }
}

impl Default for TorrentWorker {
    fn default() -> Self {
        Self::new()
    }
}
