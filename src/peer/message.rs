use bytes::Bytes;

/// A peer wire protocol message.
///
/// This is the vocabulary the message dispatcher moves between peer
/// connections and in-process handlers. The dispatcher itself never
/// inspects the variant; it only ferries values of this type.
///
/// Payload-carrying variants hold their data as [`Bytes`] so that a
/// message can be fanned out to several handlers without copying the
/// underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Empty message to keep the connection alive.
    KeepAlive,
    /// We are choking the peer (not sending data).
    Choke,
    /// We are unchoking the peer (ready to send data).
    Unchoke,
    /// We are interested in the peer's data.
    Interested,
    /// We are not interested in the peer's data.
    NotInterested,
    /// Announce that we have a piece.
    Have { piece: u32 },
    /// Bitfield of all pieces we have.
    Bitfield(Bytes),
    /// Request a block of data.
    Request { index: u32, begin: u32, length: u32 },
    /// Send piece data.
    Piece { index: u32, begin: u32, data: Bytes },
    /// Cancel a pending request.
    Cancel { index: u32, begin: u32, length: u32 },
    /// DHT port announcement.
    Port(u16),
    /// Extension protocol message ([BEP-10]).
    ///
    /// [BEP-10]: http://bittorrent.org/beps/bep_0010.html
    Extended { id: u8, payload: Bytes },
}

impl Message {
    /// Returns the message kind as a static name, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::KeepAlive => "keep-alive",
            Message::Choke => "choke",
            Message::Unchoke => "unchoke",
            Message::Interested => "interested",
            Message::NotInterested => "not-interested",
            Message::Have { .. } => "have",
            Message::Bitfield(_) => "bitfield",
            Message::Request { .. } => "request",
            Message::Piece { .. } => "piece",
            Message::Cancel { .. } => "cancel",
            Message::Port(_) => "port",
            Message::Extended { .. } => "extended",
        }
    }
}
