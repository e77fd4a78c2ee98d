//! A single actor's state as held by the [`crate::table::ActorTable`].

use std::sync::Arc;

use crate::mailbox::Mailbox;
use crate::message::{Payload, Role};

/// Liveness of an actor. There is no "uninitialized" variant: unlike the C
/// ancestor's parallel arrays (which pre-fill unused slots), the table only
/// ever holds a record for an id once it has actually been spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActorStatus {
    Alive,
    Dead,
}

/// Whether an actor currently occupies a slot in the ready-queue. This is
/// the flag spec.md §3 calls the key invariant enforcing one-handler-at-a-time:
/// an actor is appended to the ready-queue only while transitioning from
/// `Idle` to `Scheduled`, and only one such transition can be observed by the
/// holder of the system mutex at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scheduling {
    Idle,
    /// Either sitting in the ready-queue or currently being served by a
    /// worker; both cases are the same state from the perspective of "must
    /// not be enqueued a second time".
    Scheduled,
}

pub(crate) struct ActorRecord {
    pub(crate) role: Arc<Role>,
    pub(crate) state: Option<Payload>,
    pub(crate) status: ActorStatus,
    pub(crate) scheduling: Scheduling,
    pub(crate) mailbox: Mailbox,
}

impl ActorRecord {
    pub(crate) fn new(role: Arc<Role>, mailbox_capacity: usize) -> Self {
        ActorRecord {
            role,
            state: None,
            status: ActorStatus::Alive,
            scheduling: Scheduling::Idle,
            mailbox: Mailbox::new(mailbox_capacity),
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.status == ActorStatus::Alive
    }
}
