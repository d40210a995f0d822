use crate::peer::Bitfield;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-torrent lifecycle handle.
///
/// Holds the active flag that gates message dispatch for the torrent's
/// connections, and the data descriptor once metadata is known. During
/// the metadata-exchange phase there is no data descriptor yet.
pub struct TorrentDescriptor {
    active: AtomicBool,
    data: RwLock<Option<Arc<DataDescriptor>>>,
}

impl TorrentDescriptor {
    pub(crate) fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            data: RwLock::new(None),
        }
    }

    /// Marks the torrent active: its connections take part in message
    /// dispatch from the next iteration on.
    pub fn start(&self) {
        self.active.store(true, Ordering::Release);
    }

    /// Marks the torrent inactive: its connections are skipped entirely,
    /// neither drained nor supplied.
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Attaches the data descriptor once the torrent's metadata is known.
    pub fn set_data_descriptor(&self, data: Arc<DataDescriptor>) {
        *self.data.write() = Some(data);
    }

    pub fn data_descriptor(&self) -> Option<Arc<DataDescriptor>> {
        self.data.read().clone()
    }
}

/// Piece-level view of a torrent's data.
pub struct DataDescriptor {
    pieces: RwLock<Bitfield>,
}

impl DataDescriptor {
    pub fn new(piece_count: usize) -> Self {
        Self {
            pieces: RwLock::new(Bitfield::new(piece_count)),
        }
    }

    /// Total number of pieces.
    pub fn pieces_total(&self) -> usize {
        self.pieces.read().piece_count()
    }

    /// Number of pieces not yet verified.
    pub fn pieces_remaining(&self) -> usize {
        self.pieces.read().remaining()
    }

    /// Records a piece as downloaded and verified.
    pub fn mark_verified(&self, index: usize) {
        self.pieces.write().set_piece(index);
    }

    /// Snapshot of the verified-piece bitmap.
    pub fn bitfield(&self) -> Bitfield {
        self.pieces.read().clone()
    }
}
