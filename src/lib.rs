//! `cacti`: a lightweight in-process actor runtime.
//!
//! A fixed-size pool of worker threads dispatches messages out of bounded,
//! per-actor mailboxes to single-threaded actor handlers. Actors are created
//! by sending themselves a [`message::SPAWN`] message (or, for the first
//! actor, via [`ActorSystem::create`]); they terminate by receiving
//! [`message::GODIE`]. The system as a whole terminates once every actor has
//! died, or early on `SIGINT`.
//!
//! See `SPEC_FULL.md` in the repository root for the full behavioral
//! contract this crate implements.
//!
//! # Example
//!
//! ```no_run
//! use cacti::{ActorSystem, Message, Payload, Role};
//!
//! fn hello(_state: &mut Option<Payload>, _nbytes: usize, data: Payload) {
//!     let spawner = data.downcast::<usize>().unwrap();
//!     println!("actor {} says hello to {}", cacti::self_id(), spawner);
//! }
//!
//! fn die(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {}
//!
//! let role = std::sync::Arc::new(Role::new(vec![hello]));
//! let (system, first) = ActorSystem::create(role).unwrap();
//! system.send(first, Message::godie()).unwrap();
//! system.join(first).unwrap();
//! ```

mod actor;
mod config;
mod mailbox;
mod message;
mod scheduler;
mod signal;
mod system;
mod table;

/// The identity of an actor within one [`ActorSystem`]: a dense index
/// assigned at spawn time, starting at 0 for the system's first actor.
///
/// Ids are scoped to the [`ActorSystem`] that assigned them; sending one
/// system's id to another is a programmer error caught as
/// [`SendError::UnknownActor`] (or worse, silently aimed at the wrong actor,
/// if the other system happens to have that many actors too — ids are not
/// checked across systems).
pub type ActorId = usize;

pub use config::RuntimeConfig;
pub use message::{Handler, Kind, Message, Payload, Role, FIRST_USER_KIND, GODIE, HELLO, SPAWN};
pub use system::{self_id, send, ActorSystem, CreateError, JoinError, SendError};
