//! The worker-pool loop: the heart of the runtime.
//!
//! One [`Shared`] instance is held by an [`crate::ActorSystem`] and by every
//! worker thread it starts. Everything here runs under `state`'s mutex
//! except the handler invocation itself (spec.md §4.4 step 7, invariant 4).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use tracing::{debug, error, trace, warn};

use crate::actor::{ActorRecord, ActorStatus, Scheduling};
use crate::config::RuntimeConfig;
use crate::mailbox::QueueFull;
use crate::message::{Kind, Message, Payload, Role, FIRST_USER_KIND, GODIE, HELLO, SPAWN};
use crate::table::ActorTable;
use crate::ActorId;

thread_local! {
    static CURRENT_ACTOR: Cell<Option<ActorId>> = Cell::new(None);
    // Lets a handler running on this worker call `cacti::send`/`cacti::self_id`
    // without being handed an `ActorSystem`, the same way the C ancestor's
    // `send_message`/`actor_id_self` work against implicit global state.
    static CURRENT_SYSTEM: RefCell<Option<Arc<Shared>>> = RefCell::new(None);
}

pub(crate) fn current_actor() -> Option<ActorId> {
    CURRENT_ACTOR.with(|cell| cell.get())
}

/// Sends `message` to `target` using the system owning the handler currently
/// running on this thread. Returns `None` if called off a worker thread.
pub(crate) fn send_from_current_actor(
    target: ActorId,
    message: Message,
) -> Option<Result<(), crate::SendError>> {
    CURRENT_SYSTEM.with(|cell| cell.borrow().as_ref().map(|shared| shared.send(target, message)))
}

fn enter_actor(id: ActorId, shared: &Arc<Shared>) {
    CURRENT_ACTOR.with(|cell| cell.set(Some(id)));
    CURRENT_SYSTEM.with(|cell| *cell.borrow_mut() = Some(Arc::clone(shared)));
}

fn leave_actor() {
    CURRENT_ACTOR.with(|cell| cell.set(None));
    CURRENT_SYSTEM.with(|cell| *cell.borrow_mut() = None);
}

pub(crate) struct SystemState {
    pub(crate) table: ActorTable,
    ready_queue: VecDeque<ActorId>,
    alive_actors: usize,
    pub(crate) shutdown: bool,
    active_join: bool,
    waiting_workers: usize,
    working_count: usize,
}

impl SystemState {
    fn new(cast_limit: usize, pool_size: usize) -> Self {
        SystemState {
            table: ActorTable::new(cast_limit),
            ready_queue: VecDeque::new(),
            alive_actors: 0,
            shutdown: false,
            active_join: false,
            waiting_workers: 0,
            working_count: pool_size,
        }
    }
}

pub(crate) struct Shared {
    pub(crate) state: Mutex<SystemState>,
    work_available: Condvar,
    all_done: Condvar,
    pub(crate) config: RuntimeConfig,
}

impl Shared {
    pub(crate) fn new(config: RuntimeConfig) -> Self {
        Shared {
            state: Mutex::new(SystemState::new(config.cast_limit, config.pool_size)),
            work_available: Condvar::new(),
            all_done: Condvar::new(),
            config,
        }
    }

    /// Creates the first actor (id 0) running `role` and enqueues its
    /// `HELLO`. Called once, before any worker thread is started, so no
    /// locking ceremony is needed beyond what `send_hello_to_new_actor`
    /// already does.
    pub(crate) fn bootstrap_first_actor(&self, role: Arc<Role>) -> ActorId {
        let mut state = self.state.lock().unwrap();
        let id = state
            .table
            .push(ActorRecord::new(role, self.config.actor_queue_limit))
            .expect("cast_limit must allow at least one actor");
        state.alive_actors += 1;
        drop(state);
        self.enqueue_message(id, Message::hello(0));
        id
    }

    /// Implements `send_message` (spec.md §4.6): validates the target,
    /// copies the message into its mailbox, and wakes a worker if the
    /// target actor transitions from idle to runnable.
    pub(crate) fn send(&self, target: ActorId, message: Message) -> Result<(), crate::SendError> {
        let mut state = self.state.lock().unwrap();
        if state.shutdown {
            return Err(crate::SendError::NotRunning);
        }
        if !state.table.contains(target) {
            return Err(crate::SendError::UnknownActor);
        }
        if !state.table.get(target).is_alive() {
            return Err(crate::SendError::Dead);
        }
        match state.table.get_mut(target).mailbox.push(message) {
            Ok(1) => {
                // Transitioned from empty to non-empty: only (re)enqueue if
                // the actor was idle. A `Scheduled` actor with a fresh
                // single message will be picked up by its own re-enqueue
                // pass once its current handler returns.
                let record = state.table.get_mut(target);
                if record.scheduling == Scheduling::Idle {
                    record.scheduling = Scheduling::Scheduled;
                    state.ready_queue.push_back(target);
                    if state.waiting_workers > 0 {
                        self.work_available.notify_one();
                    }
                }
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(QueueFull) => Err(crate::SendError::QueueFull),
        }
    }

    /// Internal helper used for runtime-generated messages (`HELLO`) that
    /// are known to target a freshly created, idle actor and thus always
    /// succeed.
    fn enqueue_message(&self, target: ActorId, message: Message) {
        let mut state = self.state.lock().unwrap();
        state
            .table
            .get_mut(target)
            .mailbox
            .push(message)
            .expect("a brand new actor's mailbox cannot be full");
        let record = state.table.get_mut(target);
        record.scheduling = Scheduling::Scheduled;
        state.ready_queue.push_back(target);
        if state.waiting_workers > 0 {
            self.work_available.notify_one();
        }
    }

    pub(crate) fn join(&self, first_id: ActorId) -> Result<(), crate::JoinError> {
        let mut state = self.state.lock().unwrap();
        if !state.table.contains(first_id) {
            return Err(crate::JoinError::UnknownActor);
        }
        state.active_join = true;
        state = self.all_done.wait_while(state, |s| s.working_count > 0).unwrap();
        state.active_join = false;
        Ok(())
    }

    /// Called by the signal-watcher thread on `SIGINT` delivery.
    pub(crate) fn shut_down(&self) {
        let mut state = self.state.lock().unwrap();
        if state.shutdown {
            return;
        }
        state.shutdown = true;
        self.work_available.notify_all();
        if state.working_count == 0 {
            self.all_done.notify_all();
        }
    }
}

/// The body of each worker thread: repeatedly serve one ready actor's next
/// message until the system shuts down.
pub(crate) fn worker_loop(shared: Arc<Shared>) {
    loop {
        let popped = {
            let mut state = shared.state.lock().unwrap();
            if !state.shutdown {
                state.waiting_workers += 1;
                state = shared
                    .work_available
                    .wait_while(state, |s| s.ready_queue.is_empty() && !s.shutdown)
                    .unwrap();
                state.waiting_workers -= 1;
            }
            if state.shutdown {
                None
            } else {
                let id = state.ready_queue.pop_front().expect("ready_queue non-empty by wait condition");
                let message = state.table.get_mut(id).mailbox.pop();

                let record = state.table.get_mut(id);
                let now_empty = record.mailbox.is_empty();
                let draining_to_death = record.status == ActorStatus::Dead || message.kind == GODIE;
                if now_empty && draining_to_death {
                    state.alive_actors -= 1;
                }
                Some((id, message))
            }
        };

        let Some((id, message)) = popped else { break };

        enter_actor(id, &shared);
        trace!(actor = id, kind = message.kind, "dispatching message");
        dispatch(&shared, id, message);
        leave_actor();

        let mut state = shared.state.lock().unwrap();
        let record = state.table.get_mut(id);
        record.scheduling = Scheduling::Idle;
        if !record.mailbox.is_empty() {
            record.scheduling = Scheduling::Scheduled;
            state.ready_queue.push_back(id);
            if state.waiting_workers > 0 {
                shared.work_available.notify_one();
            }
        }
        if state.alive_actors == 0 {
            debug!("last actor died, shutting down");
            state.shutdown = true;
            shared.work_available.notify_all();
        }
    }

    let mut state = shared.state.lock().unwrap();
    state.working_count -= 1;
    if state.working_count == 0 {
        shared.all_done.notify_all();
    }
}

/// Dispatches one popped message: intercepts the three reserved kinds,
/// otherwise invokes the actor's own handler table (spec.md §4.5).
fn dispatch(shared: &Arc<Shared>, id: ActorId, message: Message) {
    match message.kind {
        GODIE => handle_godie(shared, id),
        SPAWN => handle_spawn(shared, id, message),
        HELLO => handle_hello(shared, id, message),
        kind => handle_user(shared, id, kind, message),
    }
}

/// HELLO is dispatched like a normal user message if the role defines a
/// handler for kind 0; otherwise it is a silent no-op (spec.md §4.5).
fn handle_hello(shared: &Arc<Shared>, id: ActorId, message: Message) {
    let handler = {
        let state = shared.state.lock().unwrap();
        state.table.get(id).role.handler_for(HELLO)
    };
    let Some(handler) = handler else { return };

    let mut slot = {
        let mut state = shared.state.lock().unwrap();
        state.table.get_mut(id).state.take()
    };
    handler(&mut slot, message.nbytes, message.data);

    let mut state = shared.state.lock().unwrap();
    state.table.get_mut(id).state = slot;
}

/// GODIE runs no user handler; it only flips status, still under the
/// system mutex (spec.md §4.5, §9 Open Questions).
fn handle_godie(shared: &Arc<Shared>, id: ActorId) {
    let mut state = shared.state.lock().unwrap();
    state.table.get_mut(id).status = ActorStatus::Dead;
    debug!(actor = id, "processed GODIE");
}

/// SPAWN allocates a new actor, still under the system mutex: no user code
/// runs for this message either.
fn handle_spawn(shared: &Arc<Shared>, spawner: ActorId, message: Message) {
    let role = match message.data.downcast::<Arc<Role>>() {
        Ok(role) => *role,
        Err(_) => {
            error!("critical: SPAWN message carried a payload that was not a role table");
            std::process::abort();
        }
    };

    let mut state = shared.state.lock().unwrap();
    if state.shutdown {
        return;
    }
    let mailbox_capacity = shared.config.actor_queue_limit;
    let new_id = match state.table.push(ActorRecord::new(role, mailbox_capacity)) {
        Some(id) => id,
        None => {
            warn!(cast_limit = shared.config.cast_limit, "SPAWN dropped: cast limit reached");
            return;
        }
    };
    state.alive_actors += 1;
    state
        .table
        .get_mut(new_id)
        .mailbox
        .push(Message::hello(spawner))
        .expect("a brand new actor's mailbox cannot be full");
    state.table.get_mut(new_id).scheduling = Scheduling::Scheduled;
    state.ready_queue.push_back(new_id);
    if state.waiting_workers > 0 {
        shared.work_available.notify_one();
    }
    debug!(actor = new_id, spawner, "spawned actor");
}

/// User-defined kinds run the actor's handler outside the system mutex
/// (spec.md §4.4 step 7, invariant 4).
fn handle_user(shared: &Arc<Shared>, id: ActorId, kind: Kind, message: Message) {
    let (handler, mut slot): (_, Option<Payload>) = {
        let mut state = shared.state.lock().unwrap();
        let role_has_kind = kind >= FIRST_USER_KIND && (kind as usize) < state.table.get(id).role.nprompts();
        if !role_has_kind {
            // Also covers HELLO/GODIE/SPAWN arriving here, which cannot
            // happen: dispatch() intercepts them before calling handle_user.
            error!(actor = id, kind, "critical: unknown message kind dispatched to a live actor");
            std::process::abort();
        }
        let record = state.table.get_mut(id);
        let handler = record.role.handler_for(kind).expect("checked above");
        let slot = record.state.take();
        (handler, slot)
    };

    handler(&mut slot, message.nbytes, message.data);

    let mut state = shared.state.lock().unwrap();
    state.table.get_mut(id).state = slot;
}
