//! Torrent registry, per-torrent exchange state, and session accounting.
//!
//! A [`TorrentRegistry`] owns one [`TorrentDescriptor`] per known
//! torrent; the descriptor's active flag is the liveness predicate the
//! dispatcher consults every iteration. The [`TorrentWorker`] tracks the
//! live peer set with per-peer transfer counters, and [`SessionState`]
//! folds those counters into torrent-wide totals that survive peer
//! disconnects.

mod descriptor;
mod registry;
mod session;
mod worker;

pub use descriptor::{DataDescriptor, TorrentDescriptor};
pub use registry::TorrentRegistry;
pub use session::{Amounts, SessionState};
pub use worker::{ConnectionState, TorrentWorker};
