use super::peer::Peer;
use crate::metainfo::TorrentId;
use crate::peer::{Message, PeerError};

/// A bidirectional message channel to one remote peer.
///
/// Implemented by the transport layer; the dispatcher only ever touches
/// a connection through this contract, and only from its loop thread.
/// Implementations must therefore support calls through a shared
/// reference (the transport typically keeps its read/write buffers
/// behind interior mutability).
pub trait PeerConnection: Send + Sync {
    /// The remote peer this connection belongs to.
    fn peer(&self) -> &Peer;

    /// The torrent this connection was established for.
    fn torrent_id(&self) -> TorrentId;

    /// Returns true once the underlying transport is gone. A closed
    /// connection is skipped by the dispatcher; lifecycle (removal from
    /// the pool, reconnects) is the owner's concern.
    fn is_closed(&self) -> bool;

    /// Non-blocking read: returns the next decoded message if the
    /// transport has one buffered, `Ok(None)` otherwise.
    fn read_message_now(&self) -> Result<Option<Message>, PeerError>;

    /// Enqueues one message for delivery to the peer.
    fn post_message(&self, message: Message) -> Result<(), PeerError>;
}
