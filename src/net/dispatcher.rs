use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, warn};

use super::connection::PeerConnection;
use super::peer::Peer;
use super::pool::PeerConnectionPool;
use crate::peer::Message;
use crate::runtime::{Config, RuntimeLifecycle};
use crate::torrent::TorrentRegistry;

/// Error type returned by consumer and supplier callbacks.
///
/// A failing callback is logged and swallowed; the dispatcher never
/// interprets the error, so registrants are free to use their own error
/// types.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

type MessageConsumer = Arc<dyn Fn(&Message) -> Result<(), CallbackError> + Send + Sync>;
type MessageSupplier = Arc<dyn Fn() -> Result<Option<Message>, CallbackError> + Send + Sync>;

type ConsumerRegistry = Arc<DashMap<Peer, Vec<MessageConsumer>>>;
type SupplierRegistry = Arc<DashMap<Peer, Vec<MessageSupplier>>>;

/// Single-threaded message dispatcher.
///
/// Owns the per-peer consumer and supplier registries and drives the
/// dispatch loop on one dedicated thread: inbound messages are drained
/// from each live connection and fanned out to that peer's consumers,
/// then suppliers are polled for outbound messages which are posted back
/// to the connection. Consumers and suppliers run on the loop thread and
/// must not block on network or long computation.
///
/// Registration is safe from any thread at any time; there is no
/// unregister. The loop thread is started by the runtime's startup hook
/// and joined by its shutdown hook.
pub struct MessageDispatcher {
    consumers: ConsumerRegistry,
    suppliers: SupplierRegistry,
}

impl MessageDispatcher {
    /// Wires a dispatcher into the runtime lifecycle. The loop thread is
    /// spawned by the registered startup task; if the OS refuses to
    /// spawn it, the failure is logged at error level and messaging
    /// stays down, per the crate's logs-only propagation policy.
    pub fn new(
        lifecycle: &RuntimeLifecycle,
        pool: Arc<PeerConnectionPool>,
        registry: Arc<TorrentRegistry>,
        config: &Config,
    ) -> Self {
        let consumers: ConsumerRegistry = Arc::new(DashMap::new());
        let suppliers: SupplierRegistry = Arc::new(DashMap::new());

        let shutdown = Arc::new(ShutdownSignal::new());
        let dispatch = DispatchLoop {
            pool,
            registry,
            consumers: consumers.clone(),
            suppliers: suppliers.clone(),
            control: LoopControl::new(config.max_message_processing_interval, shutdown.clone()),
            shutdown: shutdown.clone(),
        };

        let handle: Arc<Mutex<Option<JoinHandle<()>>>> = Arc::new(Mutex::new(None));
        {
            let handle = handle.clone();
            lifecycle.on_startup("message dispatcher", move || {
                let spawned = thread::Builder::new()
                    .name("rswarm.net.message-dispatcher".into())
                    .spawn(move || dispatch.run());
                match spawned {
                    Ok(thread) => *handle.lock() = Some(thread),
                    Err(e) => error!(error = %e, "failed to spawn message dispatcher thread"),
                }
            });
        }
        lifecycle.on_shutdown("message dispatcher", move || {
            shutdown.request();
            if let Some(thread) = handle.lock().take() {
                let _ = thread.join();
            }
        });

        Self {
            consumers,
            suppliers,
        }
    }

    /// Registers `consumer` to receive every message subsequently read
    /// from `peer`. Messages read before registration are not replayed.
    pub fn add_consumer<F>(&self, peer: Peer, consumer: F)
    where
        F: Fn(&Message) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.consumers
            .entry(peer)
            .or_default()
            .push(Arc::new(consumer));
    }

    /// Registers `supplier` to be polled for an outbound message once per
    /// iteration while `peer` is connected. Suppliers for a peer run in
    /// registration order.
    pub fn add_supplier<F>(&self, peer: Peer, supplier: F)
    where
        F: Fn() -> Result<Option<Message>, CallbackError> + Send + Sync + 'static,
    {
        self.suppliers
            .entry(peer)
            .or_default()
            .push(Arc::new(supplier));
    }
}

/// Shutdown flag shared between the dispatcher facade and the loop
/// thread. Doubles as the waker for the adaptive sleep, so requesting
/// shutdown cuts any in-flight sleep short.
struct ShutdownSignal {
    requested: Mutex<bool>,
    wake: Condvar,
}

impl ShutdownSignal {
    fn new() -> Self {
        Self {
            requested: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    fn request(&self) {
        *self.requested.lock() = true;
        self.wake.notify_all();
    }

    fn is_requested(&self) -> bool {
        *self.requested.lock()
    }

    /// Blocks for up to `duration`, or less if shutdown is requested
    /// meanwhile. Returns true if shutdown has been requested. A
    /// spurious condvar wake returns early with `false`; the caller
    /// simply runs one more iteration.
    fn sleep(&self, duration: Duration) -> bool {
        let mut requested = self.requested.lock();
        if *requested {
            return true;
        }
        self.wake.wait_for(&mut requested, duration);
        *requested
    }
}

/// Controls the time to sleep after each iteration of the dispatch loop.
///
/// Adaptive strategy: every iteration that moved no messages doubles the
/// sleep, up to the configured ceiling; any activity collapses it back
/// to 1 ms. Reaches the ceiling in ~log2(max) idle iterations while
/// keeping round-trip latency tight on a busy swarm.
struct LoopControl {
    max_sleep: Duration,
    sleep_for: Duration,
    processed: u64,
    shutdown: Arc<ShutdownSignal>,
}

const INITIAL_SLEEP: Duration = Duration::from_millis(1);

impl LoopControl {
    fn new(max_sleep: Duration, shutdown: Arc<ShutdownSignal>) -> Self {
        Self {
            max_sleep,
            sleep_for: INITIAL_SLEEP,
            processed: 0,
            shutdown,
        }
    }

    /// Called once for every message moved, inbound or outbound.
    fn increment_processed(&mut self) {
        self.processed += 1;
    }

    /// End-of-iteration barrier: sleeps only if the iteration was empty.
    fn iteration_finished(&mut self) {
        if self.processed > 0 {
            self.processed = 0;
            self.sleep_for = INITIAL_SLEEP;
            return;
        }
        if self.shutdown.sleep(self.sleep_for) {
            return;
        }
        self.sleep_for = (self.sleep_for * 2).min(self.max_sleep);
    }

    #[cfg(test)]
    fn current_interval(&self) -> Duration {
        self.sleep_for
    }
}

/// The dispatch loop proper. Runs on its own thread until shutdown.
struct DispatchLoop {
    pool: Arc<PeerConnectionPool>,
    registry: Arc<TorrentRegistry>,
    consumers: ConsumerRegistry,
    suppliers: SupplierRegistry,
    control: LoopControl,
    shutdown: Arc<ShutdownSignal>,
}

impl DispatchLoop {
    fn run(mut self) {
        debug!("message dispatch loop started");
        while !self.shutdown.is_requested() {
            self.run_iteration();
            self.control.iteration_finished();
        }
        debug!("message dispatch loop stopped");
    }

    /// One pass over both registries: inbound first, then outbound.
    /// Never concurrent for the same peer; for a fixed peer, all inbound
    /// deliveries of this iteration happen before any supplier runs.
    fn run_iteration(&mut self) {
        self.drain_inbound();
        self.pump_outbound();
    }

    fn drain_inbound(&mut self) {
        if self.consumers.is_empty() {
            return;
        }
        for peer in snapshot_keys(&self.consumers) {
            let Some(connection) = self.live_connection(&peer) else {
                continue;
            };
            loop {
                let message = match connection.read_message_now() {
                    Ok(Some(message)) => message,
                    Ok(None) => break,
                    Err(e) => {
                        error!(%peer, error = %e, "failed to read message from peer connection");
                        break;
                    }
                };
                self.control.increment_processed();

                // Snapshot at the instant of delivery: consumers added
                // later in this iteration do not see this message.
                let handlers = match self.consumers.get(&peer) {
                    Some(entry) => entry.value().clone(),
                    None => break,
                };
                for handler in &handlers {
                    if let Err(e) = handler(&message) {
                        warn!(%peer, kind = message.kind(), error = %e, "message consumer failed");
                    }
                }
            }
        }
    }

    fn pump_outbound(&mut self) {
        if self.suppliers.is_empty() {
            return;
        }
        for peer in snapshot_keys(&self.suppliers) {
            let Some(connection) = self.live_connection(&peer) else {
                continue;
            };
            let suppliers = match self.suppliers.get(&peer) {
                Some(entry) => entry.value().clone(),
                None => continue,
            };
            for supplier in &suppliers {
                let message = match supplier() {
                    Ok(Some(message)) => message,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!(%peer, error = %e, "message supplier failed");
                        continue;
                    }
                };
                self.control.increment_processed();
                if let Err(e) = connection.post_message(message) {
                    error!(%peer, error = %e, "failed to post message to peer connection");
                }
            }
        }
    }

    /// Resolves a peer to a connection that should take part in this
    /// iteration: present in the pool, not closed, and belonging to a
    /// supported and active torrent.
    fn live_connection(&self, peer: &Peer) -> Option<Arc<dyn PeerConnection>> {
        let connection = self.pool.get_connection(peer)?;
        if connection.is_closed() {
            return None;
        }
        if !self.registry.is_supported_and_active(connection.torrent_id()) {
            return None;
        }
        Some(connection)
    }
}

fn snapshot_keys<V>(map: &DashMap<Peer, V>) -> Vec<Peer> {
    map.iter().map(|entry| entry.key().clone()).collect()
}
