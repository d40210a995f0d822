//! Runtime configuration and lifecycle binding.

use parking_lot::Mutex;
use std::time::Duration;
use tracing::debug;

/// Default ceiling for the dispatcher's adaptive sleep.
pub const DEFAULT_MAX_MESSAGE_PROCESSING_INTERVAL: Duration = Duration::from_millis(100);

/// Runtime tuning knobs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ceiling for the adaptive sleep between dispatch iterations. Caps
    /// worst-case idle latency: after traffic stops, the dispatcher
    /// never sleeps longer than this before noticing new messages.
    pub max_message_processing_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_message_processing_interval: DEFAULT_MAX_MESSAGE_PROCESSING_INTERVAL,
        }
    }
}

type LifecycleTask = Box<dyn FnOnce() + Send>;

/// Collects labelled tasks to run when the runtime starts up and shuts
/// down.
///
/// Components register their tasks at construction time; the runtime
/// owner calls [`startup`](Self::startup) once everything is wired and
/// [`shutdown`](Self::shutdown) when tearing down. Tasks run in
/// registration order, on the calling thread.
pub struct RuntimeLifecycle {
    startup: Mutex<Vec<(String, LifecycleTask)>>,
    shutdown: Mutex<Vec<(String, LifecycleTask)>>,
}

impl RuntimeLifecycle {
    pub fn new() -> Self {
        Self {
            startup: Mutex::new(Vec::new()),
            shutdown: Mutex::new(Vec::new()),
        }
    }

    pub fn on_startup(&self, label: impl Into<String>, task: impl FnOnce() + Send + 'static) {
        self.startup.lock().push((label.into(), Box::new(task)));
    }

    pub fn on_shutdown(&self, label: impl Into<String>, task: impl FnOnce() + Send + 'static) {
        self.shutdown.lock().push((label.into(), Box::new(task)));
    }

    /// Runs all registered startup tasks. Tasks registered after this
    /// call are not run retroactively.
    pub fn startup(&self) {
        for (label, task) in self.startup.lock().drain(..) {
            debug!(%label, "running startup task");
            task();
        }
    }

    /// Runs all registered shutdown tasks.
    pub fn shutdown(&self) {
        for (label, task) in self.shutdown.lock().drain(..) {
            debug!(%label, "running shutdown task");
            task();
        }
    }
}

impl Default for RuntimeLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_tasks_run_in_registration_order() {
        let lifecycle = RuntimeLifecycle::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = log.clone();
            lifecycle.on_startup(tag, move || log.lock().push(tag));
        }
        {
            let log = log.clone();
            lifecycle.on_shutdown("teardown", move || log.lock().push("teardown"));
        }

        lifecycle.startup();
        assert_eq!(*log.lock(), vec!["first", "second"]);

        lifecycle.shutdown();
        assert_eq!(*log.lock(), vec!["first", "second", "teardown"]);
    }

    #[test]
    fn test_startup_runs_each_task_once() {
        let lifecycle = RuntimeLifecycle::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        lifecycle.on_startup("count", move || {
            counter.fetch_add(1, Ordering::AcqRel);
        });

        lifecycle.startup();
        lifecycle.startup();
        assert_eq!(runs.load(Ordering::Acquire), 1);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.max_message_processing_interval,
            DEFAULT_MAX_MESSAGE_PROCESSING_INTERVAL
        );
    }
}
