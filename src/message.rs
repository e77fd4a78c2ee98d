//! Messages and roles: the immutable vocabulary actors are built from.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A message kind. Values below [`SPAWN`] (3) are reserved by the runtime;
/// user-defined kinds start at 3.
pub type Kind = u32;

/// Sent automatically by the runtime to every newly spawned actor. `data`
/// carries the spawner's [`ActorId`](crate::ActorId).
pub const HELLO: Kind = 0;

/// Flips the receiving actor's status to dead. Runs no user handler.
pub const GODIE: Kind = 1;

/// `data` is a role table for the actor to spawn.
pub const SPAWN: Kind = 2;

/// The first user-definable message kind.
pub const FIRST_USER_KIND: Kind = 3;

/// An opaque, type-erased payload. The runtime moves it in and out of
/// mailboxes by value but never inspects its contents, mirroring the `void
/// *data` of spec.md's C ancestor — except that in Rust, ownership is
/// explicit: a `Payload` dropped without being read is simply freed, there is
/// no caller-managed lifetime to leak.
pub type Payload = Box<dyn Any + Send>;

/// A message queued for delivery to one actor.
pub struct Message {
    pub kind: Kind,
    /// Size hint for `data`; informational only, the runtime does not
    /// interpret it.
    pub nbytes: usize,
    pub data: Payload,
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message").field("kind", &self.kind).field("nbytes", &self.nbytes).finish()
    }
}

impl Message {
    /// Builds a user message with no size hint.
    pub fn new(kind: Kind, data: Payload) -> Self {
        Message { kind, nbytes: 0, data }
    }

    /// Builds a user message carrying an explicit size hint.
    pub fn with_nbytes(kind: Kind, nbytes: usize, data: Payload) -> Self {
        Message { kind, nbytes, data }
    }

    /// Builds the internal message requesting the spawn of a new actor
    /// running `role`.
    pub fn spawn(role: Arc<Role>) -> Self {
        Message { kind: SPAWN, nbytes: 0, data: Box::new(role) }
    }

    /// Builds the internal message telling an actor to die.
    pub fn godie() -> Self {
        Message { kind: GODIE, nbytes: 0, data: Box::new(()) }
    }

    pub(crate) fn hello(spawner: crate::ActorId) -> Self {
        Message { kind: HELLO, nbytes: 0, data: Box::new(spawner) }
    }
}

/// A handler invoked by the runtime for exactly one message. Handlers run to
/// completion on the worker that dispatches them; there is no preemption and
/// no suspension point visible to the runtime.
///
/// `state` is the actor's single mutable slot: `None` until first written,
/// afterwards whatever the handler chooses to store there.
pub type Handler = fn(state: &mut Option<Payload>, nbytes: usize, data: Payload);

/// An immutable table binding message kinds to handlers. Kinds `>= nprompts`
/// (excluding the three reserved kinds, which the runtime intercepts before
/// consulting the table) are a fatal dispatch error.
pub struct Role {
    prompts: Vec<Handler>,
}

impl Role {
    pub fn new(prompts: Vec<Handler>) -> Self {
        Role { prompts }
    }

    pub fn nprompts(&self) -> usize {
        self.prompts.len()
    }

    pub(crate) fn handler_for(&self, kind: Kind) -> Option<Handler> {
        self.prompts.get(kind as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {}

    #[test]
    fn role_indexes_handlers_by_kind() {
        let role = Role::new(vec![noop, noop, noop, noop]);
        assert_eq!(role.nprompts(), 4);
        assert!(role.handler_for(3).is_some());
        assert!(role.handler_for(4).is_none());
    }

    #[test]
    fn hello_message_carries_spawner_id() {
        let message = Message::hello(7);
        assert_eq!(message.kind, HELLO);
        assert_eq!(*message.data.downcast::<crate::ActorId>().unwrap(), 7);
    }
}
