//! Public lifecycle API: [`ActorSystem::create`], [`ActorSystem::send`],
//! [`ActorSystem::join`], and the free function [`self_id`].

use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::{error, info};

use crate::config::RuntimeConfig;
use crate::message::{Message, Role};
use crate::scheduler::{self, Shared};
use crate::signal::SignalWatcher;
use crate::ActorId;

/// Failure modes of [`ActorSystem::send`], mirroring the `-1`/`-2`/`-3`
/// contract of spec.md §4.6/§6. [`SendError::code`] recovers those integers
/// for callers that need the original numeric contract.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The system is not running (shut down, or the target is dead, or the
    /// underlying allocation failed). Corresponds to code `-1`.
    #[error("the target actor is dead or the system is shutting down")]
    NotRunning,
    /// Same external code as `NotRunning`; kept distinct internally for
    /// clarity, merged at `.code()`.
    #[error("the target actor is dead")]
    Dead,
    /// `target_id` does not name a known actor. Corresponds to code `-2`.
    #[error("no such actor")]
    UnknownActor,
    /// The target mailbox is already at `ACTOR_QUEUE_LIMIT`. Corresponds to
    /// code `-3`.
    #[error("target mailbox is full")]
    QueueFull,
}

impl SendError {
    /// Recovers the integer error code spec.md §4.6 assigns to this failure.
    pub fn code(self) -> i32 {
        match self {
            SendError::NotRunning | SendError::Dead => -1,
            SendError::UnknownActor => -2,
            SendError::QueueFull => -3,
        }
    }
}

/// Failure modes of [`ActorSystem::join`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// `first_id` does not name a known actor; spec.md §4.6 says `join`
    /// "returns without tearing down" in this case.
    #[error("no such actor")]
    UnknownActor,
}

/// Failure modes of [`ActorSystem::create`].
#[derive(Debug, Error)]
pub enum CreateError {
    /// Spawning one of the `pool_size` worker threads failed.
    #[error("failed to start worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    /// Installing the SIGINT watcher thread failed.
    #[error("failed to install signal handler: {0}")]
    SignalSetup(#[source] std::io::Error),
}

/// A single running actor runtime: its own worker pool, mutex-guarded actor
/// table, ready-queue, and SIGINT watcher.
///
/// Not a process-wide singleton (see `SPEC_FULL.md` section A): a process
/// may run several `ActorSystem`s concurrently, each fully independent.
pub struct ActorSystem {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
    _signal_watcher: SignalWatcher,
}

impl ActorSystem {
    /// Initializes the runtime, starts its worker pool, creates actor 0
    /// running `role`, and enqueues its `HELLO`. Returns the system handle
    /// and actor 0's id.
    pub fn create(role: Arc<Role>) -> Result<(ActorSystem, ActorId), CreateError> {
        Self::create_with_config(role, RuntimeConfig::default())
    }

    /// As [`ActorSystem::create`], but with an explicit [`RuntimeConfig`]
    /// instead of one derived from the environment. Mainly useful for tests
    /// that need a tiny `actor_queue_limit` or `cast_limit`.
    pub fn create_with_config(
        role: Arc<Role>,
        config: RuntimeConfig,
    ) -> Result<(ActorSystem, ActorId), CreateError> {
        let shared = Arc::new(Shared::new(config));
        let first_id = shared.bootstrap_first_actor(role);

        let mut workers = Vec::with_capacity(config.pool_size);
        for index in 0..config.pool_size {
            let worker_shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("cacti-worker-{index}"))
                .spawn(move || scheduler::worker_loop(worker_shared))
                .map_err(CreateError::WorkerSpawn)?;
            workers.push(handle);
        }

        let signal_watcher =
            SignalWatcher::install(Arc::clone(&shared)).map_err(CreateError::SignalSetup)?;

        info!(pool_size = config.pool_size, first_id, "actor system started");
        Ok((ActorSystem { shared, workers, _signal_watcher: signal_watcher }, first_id))
    }

    /// Sends `message` to `target`. See [`SendError`] for failure modes.
    pub fn send(&self, target: ActorId, message: Message) -> Result<(), SendError> {
        self.shared.send(target, message)
    }

    /// Blocks until every worker thread has exited, which happens once
    /// every actor has died (or the system was shut down by a signal), then
    /// tears the runtime down.
    ///
    /// `first_id` must name a known actor (conventionally actor 0); this
    /// mirrors spec.md §4.6's validation, which otherwise leaves the
    /// runtime untouched.
    pub fn join(self, first_id: ActorId) -> Result<(), JoinError> {
        self.shared.join(first_id)?;
        for (index, worker) in self.workers.into_iter().enumerate() {
            if let Err(panic) = worker.join() {
                error!(worker = index, panic = ?panic, "worker thread panicked");
            }
        }
        Ok(())
    }
}

/// Returns the id of the actor whose handler is currently running on the
/// calling thread.
///
/// # Panics
///
/// Panics if called from a thread that is not currently serving an actor
/// (spec.md §4.6 leaves this undefined; we turn the misuse into a
/// deterministic panic rather than returning a bogus id).
pub fn self_id() -> ActorId {
    scheduler::current_actor().expect("self_id() called from outside an actor handler")
}

/// Sends `message` to `target` on behalf of the actor whose handler is
/// currently running on the calling thread — the free-function counterpart
/// to [`ActorSystem::send`] that handlers use to message siblings, their
/// parent, or themselves (e.g. to `SPAWN` a child or to self-`GODIE`),
/// exactly as `silnia.c`/`macierz.c`'s handlers call `send_message` with no
/// system handle in scope.
///
/// # Panics
///
/// Panics if called from a thread that is not currently serving an actor,
/// for the same reason [`self_id`] does.
pub fn send(target: ActorId, message: Message) -> Result<(), SendError> {
    scheduler::send_from_current_actor(target, message)
        .expect("send() called from outside an actor handler")
}
