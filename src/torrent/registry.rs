use super::descriptor::TorrentDescriptor;
use crate::metainfo::TorrentId;
use dashmap::DashMap;
use std::sync::Arc;

/// Knows every torrent the runtime currently serves.
///
/// The registry answers the dispatcher's liveness question: a torrent is
/// "supported and active" when it has been registered and its descriptor
/// has been started. The answer may change at any iteration boundary.
pub struct TorrentRegistry {
    torrents: DashMap<TorrentId, Arc<TorrentDescriptor>>,
}

impl TorrentRegistry {
    pub fn new() -> Self {
        Self {
            torrents: DashMap::new(),
        }
    }

    /// Registers a torrent, returning its descriptor. Registering the
    /// same id again returns the existing descriptor.
    pub fn register(&self, torrent_id: TorrentId) -> Arc<TorrentDescriptor> {
        self.torrents
            .entry(torrent_id)
            .or_insert_with(|| Arc::new(TorrentDescriptor::new()))
            .value()
            .clone()
    }

    pub fn get(&self, torrent_id: TorrentId) -> Option<Arc<TorrentDescriptor>> {
        self.torrents.get(&torrent_id).map(|entry| entry.value().clone())
    }

    /// True when the torrent is registered and currently active.
    pub fn is_supported_and_active(&self, torrent_id: TorrentId) -> bool {
        self.torrents
            .get(&torrent_id)
            .map(|entry| entry.value().is_active())
            .unwrap_or(false)
    }
}

impl Default for TorrentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
