use super::descriptor::TorrentDescriptor;
use super::worker::TorrentWorker;
use crate::net::Peer;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A peer's transfer counters sampled at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Amounts {
    pub downloaded: u64,
    pub uploaded: u64,
}

/// Torrent-wide session counters, queryable from any thread.
///
/// Transfer totals are assembled from two ledgers: the last-known
/// snapshot of every connected peer, and two accumulators holding the
/// final snapshot of every peer that has since disconnected. Nobody
/// tells the aggregator about disconnects; it discovers them by diffing
/// the worker's live peer set against its own snapshots, which keeps
/// each peer's contribution on exactly one side of the ledger and makes
/// the totals non-decreasing across calls.
pub struct SessionState {
    descriptor: Arc<TorrentDescriptor>,
    worker: Arc<TorrentWorker>,
    /// Last-known amounts for each peer seen while connected.
    recent: Mutex<HashMap<Peer, Amounts>>,
    downloaded_from_disconnected: AtomicU64,
    uploaded_to_disconnected: AtomicU64,
}

impl SessionState {
    pub fn new(descriptor: Arc<TorrentDescriptor>, worker: Arc<TorrentWorker>) -> Self {
        Self {
            descriptor,
            worker,
            recent: Mutex::new(HashMap::new()),
            downloaded_from_disconnected: AtomicU64::new(0),
            uploaded_to_disconnected: AtomicU64::new(0),
        }
    }

    /// Total piece count, or 1 while the torrent has no data descriptor
    /// yet (metadata phase).
    pub fn pieces_total(&self) -> usize {
        match self.descriptor.data_descriptor() {
            Some(data) => data.pieces_total(),
            None => 1,
        }
    }

    /// Remaining piece count, with the same metadata-phase placeholder.
    pub fn pieces_remaining(&self) -> usize {
        match self.descriptor.data_descriptor() {
            Some(data) => data.pieces_remaining(),
            None => 1,
        }
    }

    /// Cumulative bytes downloaded on this torrent since session start,
    /// including bytes from peers that have since disconnected.
    pub fn downloaded(&self) -> u64 {
        let mut recent = self.recent.lock();
        self.fold_amounts(&mut recent);
        let connected: u64 = recent.values().map(|amounts| amounts.downloaded).sum();
        connected + self.downloaded_from_disconnected.load(Ordering::Relaxed)
    }

    /// Cumulative bytes uploaded on this torrent since session start.
    pub fn uploaded(&self) -> u64 {
        let mut recent = self.recent.lock();
        self.fold_amounts(&mut recent);
        let connected: u64 = recent.values().map(|amounts| amounts.uploaded).sum();
        connected + self.uploaded_to_disconnected.load(Ordering::Relaxed)
    }

    /// Snapshot of the worker's currently connected peers.
    pub fn connected_peers(&self) -> HashSet<Peer> {
        self.worker.peers()
    }

    /// Refreshes the connected-peer snapshots and migrates peers that
    /// have dropped out of the live set into the disconnected
    /// accumulators. Overwriting before migrating is what keeps a peer
    /// from being counted twice: a peer present in both sets contributes
    /// through its fresh snapshot only, and a peer present only in
    /// `recent` was just lost, so its last-seen amounts become its
    /// permanent contribution.
    fn fold_amounts(&self, recent: &mut HashMap<Peer, Amounts>) {
        let mut live = HashMap::new();
        for peer in self.worker.peers() {
            if let Some(state) = self.worker.connection_state(&peer) {
                live.insert(peer, state.amounts());
            }
        }

        for (peer, amounts) in &live {
            recent.insert(peer.clone(), *amounts);
        }

        recent.retain(|peer, amounts| {
            if live.contains_key(peer) {
                return true;
            }
            self.downloaded_from_disconnected
                .fetch_add(amounts.downloaded, Ordering::Relaxed);
            self.uploaded_to_disconnected
                .fetch_add(amounts.uploaded, Ordering::Relaxed);
            false
        });
    }
}
