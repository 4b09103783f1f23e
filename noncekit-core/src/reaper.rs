//! Background reclamation of expired entries.
//!
//! One named thread per store waits on a control channel with a timeout equal
//! to the current sweep interval. A timeout triggers a sweep; a reconfigure
//! signal abandons the wait and restarts it with the freshly read interval.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::error::{NonceError, NonceResult};
use crate::store::Shared;

const THREAD_NAME: &str = "noncekit-reaper";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// The expiration changed; re-derive the sweep interval.
    Reconfigure,
    Shutdown,
}

/// Handle to the reclamation thread owned by a store.
#[derive(Debug)]
pub(crate) struct Reaper {
    control: Mutex<Option<Sender<Signal>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Reaper {
    /// Starts the reclamation thread for `shared`.
    ///
    /// # Errors
    ///
    /// Returns [`NonceError::Reaper`] if the thread cannot be spawned.
    pub(crate) fn spawn(shared: Arc<Shared>) -> NonceResult<Self> {
        let (control, signals) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(&shared, &signals))
            .map_err(|err| NonceError::Reaper(err.to_string()))?;
        Ok(Self {
            control: Mutex::new(Some(control)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Interrupts the pending wait so the next one uses the current interval.
    pub(crate) fn reconfigure(&self) {
        let control = self.control.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(control) = control.as_ref() {
            if control.send(Signal::Reconfigure).is_err() {
                warn!("reclamation loop is gone, sweep interval not updated");
            }
        }
    }

    /// Stops the thread and waits for it to exit. Idempotent.
    pub(crate) fn shutdown(&self) {
        let control = self
            .control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(control) = control {
            let _ = control.send(Signal::Shutdown);
        }
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("reclamation loop panicked");
            }
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

fn run(shared: &Shared, signals: &Receiver<Signal>) {
    debug!("reclamation loop started");
    loop {
        match signals.recv_timeout(shared.sweep_interval()) {
            Err(RecvTimeoutError::Timeout) => {
                let reclaimed = shared.reclaim_expired();
                if reclaimed > 0 {
                    debug!("reclaimed {reclaimed} expired nonces");
                }
            }
            Ok(Signal::Reconfigure) => {
                debug!(
                    "sweep interval reconfigured to {:?}",
                    shared.sweep_interval()
                );
            }
            Ok(Signal::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("reclamation loop stopped");
}
