use super::*;
use crate::metainfo::TorrentId;
use crate::peer::{Message, PeerError, PeerId};
use crate::runtime::{Config, RuntimeLifecycle};
use crate::torrent::TorrentRegistry;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

struct StubConnection {
    peer: Peer,
    torrent_id: TorrentId,
}

impl StubConnection {
    fn new(peer: Peer, torrent_id: TorrentId) -> Arc<Self> {
        Arc::new(Self { peer, torrent_id })
    }
}

impl PeerConnection for StubConnection {
    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn torrent_id(&self) -> TorrentId {
        self.torrent_id
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn read_message_now(&self) -> Result<Option<Message>, PeerError> {
        Ok(None)
    }

    fn post_message(&self, _message: Message) -> Result<(), PeerError> {
        Ok(())
    }
}

fn hash_of(peer: &Peer) -> u64 {
    let mut hasher = DefaultHasher::new();
    peer.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_peer_identity_is_address_based() {
    let bare = Peer::new(addr(6881));
    let with_id = Peer::with_peer_id(addr(6881), PeerId::generate());
    let other = Peer::new(addr(6882));

    assert_eq!(bare, with_id);
    assert_eq!(hash_of(&bare), hash_of(&with_id));
    assert_ne!(bare, other);

    assert!(bare.peer_id().is_none());
    assert!(with_id.peer_id().is_some());
    assert_eq!(with_id.addr(), addr(6881));
}

#[test]
fn test_pool_get_and_size() {
    let id = TorrentId::from_bytes([1; 20]);
    let pool = PeerConnectionPool::new();
    let peer = Peer::new(addr(6881));

    assert!(pool.get_connection(&peer).is_none());
    assert_eq!(pool.size(), 0);

    pool.add_connection_if_absent(StubConnection::new(peer.clone(), id));
    assert_eq!(pool.size(), 1);
    assert!(pool.get_connection(&peer).is_some());
}

#[test]
fn test_pool_add_if_absent_keeps_existing() {
    let id = TorrentId::from_bytes([1; 20]);
    let pool = PeerConnectionPool::new();
    let peer = Peer::new(addr(6881));

    let first = StubConnection::new(peer.clone(), id);
    let second = StubConnection::new(peer, id);

    let added = pool.add_connection_if_absent(first.clone());
    assert!(Arc::ptr_eq(&added, &(first.clone() as Arc<dyn PeerConnection>)));

    let kept = pool.add_connection_if_absent(second);
    assert!(Arc::ptr_eq(&kept, &(first as Arc<dyn PeerConnection>)));
    assert_eq!(pool.size(), 1);
}

#[test]
fn test_pool_visits_connections_per_torrent() {
    let wanted = TorrentId::from_bytes([1; 20]);
    let other = TorrentId::from_bytes([2; 20]);
    let pool = PeerConnectionPool::new();

    pool.add_connection_if_absent(StubConnection::new(Peer::new(addr(6881)), wanted));
    pool.add_connection_if_absent(StubConnection::new(Peer::new(addr(6882)), wanted));
    pool.add_connection_if_absent(StubConnection::new(Peer::new(addr(6883)), other));

    let mut visited = Vec::new();
    pool.visit_connections(wanted, |connection| {
        visited.push(connection.peer().clone());
    });

    visited.sort_by_key(|peer| peer.addr().port());
    assert_eq!(
        visited,
        vec![Peer::new(addr(6881)), Peer::new(addr(6882))]
    );
}

#[test]
fn test_dispatcher_shutdown_wakes_sleeping_loop() {
    let id = TorrentId::from_bytes([3; 20]);
    let lifecycle = RuntimeLifecycle::new();
    let pool = Arc::new(PeerConnectionPool::new());
    let registry = Arc::new(TorrentRegistry::new());
    registry.register(id).start();

    let config = Config {
        max_message_processing_interval: Duration::from_millis(64),
    };
    let dispatcher = MessageDispatcher::new(&lifecycle, pool.clone(), registry, &config);

    let peer = Peer::new(addr(6881));
    pool.add_connection_if_absent(StubConnection::new(peer.clone(), id));

    let polls = Arc::new(AtomicUsize::new(0));
    {
        let polls = polls.clone();
        dispatcher.add_supplier(peer, move || {
            polls.fetch_add(1, Ordering::AcqRel);
            Ok(None)
        });
    }

    lifecycle.startup();

    // let the loop run some empty iterations so the backoff has grown
    let deadline = Instant::now() + Duration::from_secs(5);
    while polls.load(Ordering::Acquire) < 3 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(polls.load(Ordering::Acquire) >= 3);

    // shutdown must cut any in-flight sleep short and join the thread
    let start = Instant::now();
    lifecycle.shutdown();
    assert!(start.elapsed() < Duration::from_secs(5));

    // no callbacks fire once shutdown has returned
    let after = polls.load(Ordering::Acquire);
    thread::sleep(Duration::from_millis(150));
    assert_eq!(polls.load(Ordering::Acquire), after);
}

#[test]
fn test_registrations_from_other_threads_become_visible() {
    let id = TorrentId::from_bytes([4; 20]);
    let lifecycle = RuntimeLifecycle::new();
    let pool = Arc::new(PeerConnectionPool::new());
    let registry = Arc::new(TorrentRegistry::new());
    registry.register(id).start();

    let dispatcher = Arc::new(MessageDispatcher::new(
        &lifecycle,
        pool.clone(),
        registry,
        &Config::default(),
    ));

    let peer = Peer::new(addr(6881));
    pool.add_connection_if_absent(StubConnection::new(peer.clone(), id));

    lifecycle.startup();

    let polls = Arc::new(AtomicUsize::new(0));
    {
        let dispatcher = dispatcher.clone();
        let polls = polls.clone();
        let peer = peer.clone();
        thread::spawn(move || {
            dispatcher.add_supplier(peer, move || {
                polls.fetch_add(1, Ordering::AcqRel);
                Ok(None)
            });
        })
        .join()
        .unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while polls.load(Ordering::Acquire) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(polls.load(Ordering::Acquire) > 0);

    lifecycle.shutdown();
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_shared_types_are_send_sync() {
    assert_send_sync::<MessageDispatcher>();
    assert_send_sync::<PeerConnectionPool>();
    assert_send_sync::<Peer>();
}

#[test]
fn test_display_formats_address() {
    let peer = Peer::new(addr(6881));
    assert_eq!(peer.to_string(), "127.0.0.1:6881");
}
