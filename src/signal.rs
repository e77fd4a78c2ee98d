//! SIGINT handling.
//!
//! spec.md §9 requires an orderly shutdown on `SIGINT` without calling
//! anything async-signal-unsafe from inside a signal handler (mutexes and
//! condvars are not on the async-signal-safe list). Rather than install a
//! `sigaction`, we follow the pattern other in-process runtimes use with the
//! `signal-hook` crate: a dedicated background thread blocks on a
//! self-pipe-backed iterator and reacts to the signal as ordinary code.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;
use tracing::info;

use crate::scheduler::Shared;

/// Owns the background thread watching for `SIGINT`. Dropping it detaches
/// the thread; the thread itself exits once the `Signals` iterator is
/// closed, which happens when the process exits.
pub(crate) struct SignalWatcher {
    _handle: JoinHandle<()>,
}

impl SignalWatcher {
    pub(crate) fn install(shared: Arc<Shared>) -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT])?;
        let handle = thread::Builder::new().name("cacti-signal-watcher".into()).spawn(move || {
            for signal in signals.forever() {
                info!(signal, "received signal, shutting down");
                shared.shut_down();
            }
        })?;
        Ok(SignalWatcher { _handle: handle })
    }
}
