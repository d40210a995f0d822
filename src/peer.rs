//! Peer wire protocol vocabulary (BEP-3, BEP-10)
//!
//! This module defines the message set exchanged with remote peers, the
//! peer client identifier, and the piece bitfield. Encoding and decoding
//! are the transport's concern and live behind the connection contract in
//! [`crate::net`].

mod bitfield;
mod error;
mod message;
mod peer_id;

pub use bitfield::Bitfield;
pub use error::PeerError;
pub use message::Message;
pub use peer_id::PeerId;
