//! rswarm - peer messaging core for a BitTorrent client
//!
//! This library implements the messaging heart of a BitTorrent client:
//! for every connected remote peer it receives protocol messages from
//! the transport, fans them out to interested in-process consumers, and
//! posts outgoing messages produced by registered suppliers. One
//! dedicated thread drives all peers cooperatively, with an adaptive
//! backoff that keeps idle CPU near zero.
//!
//! # Modules
//!
//! - [`peer`] - Peer wire message vocabulary, peer id, piece bitfield
//! - [`metainfo`] - Torrent identity and metainfo-boundary guards
//! - [`net`] - Connection contract, connection pool, message dispatcher
//! - [`torrent`] - Torrent registry, worker state, session accounting
//! - [`runtime`] - Configuration and lifecycle binding
//!
//! # Example
//!
//! ```
//! use rswarm::{
//!     Config, MessageDispatcher, Peer, PeerConnectionPool, RuntimeLifecycle, TorrentRegistry,
//! };
//! use std::sync::Arc;
//!
//! let lifecycle = RuntimeLifecycle::new();
//! let pool = Arc::new(PeerConnectionPool::new());
//! let registry = Arc::new(TorrentRegistry::new());
//!
//! let dispatcher = MessageDispatcher::new(&lifecycle, pool, registry, &Config::default());
//!
//! let peer = Peer::new("198.51.100.7:6881".parse().unwrap());
//! dispatcher.add_consumer(peer, |message| {
//!     println!("received {}", message.kind());
//!     Ok(())
//! });
//!
//! lifecycle.startup();
//! // ... establish connections, run the session ...
//! lifecycle.shutdown();
//! ```

pub mod metainfo;
pub mod net;
pub mod peer;
pub mod runtime;
pub mod torrent;

pub use metainfo::{MetainfoError, TorrentFile, TorrentId};
pub use net::{CallbackError, MessageDispatcher, Peer, PeerConnection, PeerConnectionPool};
pub use peer::{Bitfield, Message, PeerError, PeerId};
pub use runtime::{Config, RuntimeLifecycle};
pub use torrent::{
    Amounts, ConnectionState, DataDescriptor, SessionState, TorrentDescriptor, TorrentRegistry,
    TorrentWorker,
};
