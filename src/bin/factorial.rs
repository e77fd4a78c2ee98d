//! Computes `n!` by spawning a fresh actor for each factor, ported from
//! `silnia.c` (spec.md §8 scenario S1). Reads a single integer `n` from
//! stdin and prints the result.
//!
//! The original C driver shares one `actor_state_t` between a parent and its
//! child by handing the child's own heap pointer across the `CALLBACK`
//! message and mutating it from the parent's handler — harmless under a
//! single global mutex, but foreign to Rust's ownership model. This port
//! keeps the same message sequence and multiplication order, but has
//! `callback_handler` compute the child's next `(current, last)` from its
//! own state and hand those values to the child by value in the `COUNT`
//! message, so every actor only ever touches state it owns.

use std::io::{self, Read};
use std::sync::{Arc, Mutex};

use cacti::{ActorId, ActorSystem, Kind, Message, Payload, Role};

/// One actor's place in the chain: whether it is the root link, its parent
/// (meaningless for the root), the shared accumulator, and which factor
/// (`current`) this link contributes.
struct Chain {
    first: bool,
    parent: ActorId,
    result: Arc<Mutex<u64>>,
    limit: u64,
    current: u64,
}

/// Parent → child handoff computed by `callback_handler`, consumed by
/// `child_count`.
struct Count {
    current: u64,
    limit: u64,
    last: bool,
    result: Arc<Mutex<u64>>,
}

/// Driver → root handoff carrying the target `n` and the output cell.
struct Init {
    target: u64,
    result: Arc<Mutex<u64>>,
}

const MSG_CALLBACK: Kind = 3;
const MSG_CLEAR: Kind = 4;
/// Root-only: kicks off the chain once `n` is known. Shares its numeric
/// value with [`MSG_COUNT`] the same way `silnia.c`'s own `MSG_INIT` and
/// `MSG_COUNT` both equal 3 — safe, because each actor only ever consults
/// its own role's handler table.
const MSG_ROOT_INIT: Kind = 5;
/// Child-only: continue the chain by one more factor.
const MSG_COUNT: Kind = 5;

fn unused(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    unreachable!("reserved message kind, never dispatched to a user handler")
}

fn root_hello(state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    *state = Some(Box::new(Chain {
        first: true,
        parent: cacti::self_id(),
        result: Arc::new(Mutex::new(0)),
        limit: 0,
        current: 0,
    }));
}

fn root_init(state: &mut Option<Payload>, _nbytes: usize, data: Payload) {
    let init = data.downcast::<Init>().expect("MSG_ROOT_INIT carries an Init payload");
    let chain = state.as_mut().unwrap().downcast_mut::<Chain>().unwrap();
    chain.limit = init.target;
    chain.result = Arc::clone(&init.result);

    cacti::send(cacti::self_id(), Message::spawn(child_role())).expect("self-send never fails here");
}

fn child_hello(state: &mut Option<Payload>, _nbytes: usize, data: Payload) {
    let parent = *data.downcast::<ActorId>().expect("HELLO carries the spawner's id");
    *state =
        Some(Box::new(Chain { first: false, parent, result: Arc::new(Mutex::new(0)), limit: 0, current: 0 }));
    cacti::send(parent, Message::new(MSG_CALLBACK, Box::new(cacti::self_id())))
        .expect("parent cannot have died before its own child calls back");
}

/// Shared by both roles: a child just spawned reports back so its parent
/// can tell it where it sits in the chain.
fn callback_handler(state: &mut Option<Payload>, _nbytes: usize, data: Payload) {
    let child = *data.downcast::<ActorId>().expect("CALLBACK carries the child's id");
    let chain = state.as_ref().unwrap().downcast_ref::<Chain>().unwrap();

    let next_current = chain.current + 1;
    let last = next_current == chain.limit;
    let count = Count { current: next_current, limit: chain.limit, last, result: Arc::clone(&chain.result) };
    cacti::send(child, Message::new(MSG_COUNT, Box::new(count))).expect("fresh child cannot be dead yet");
}

fn child_count(state: &mut Option<Payload>, _nbytes: usize, data: Payload) {
    let count = data.downcast::<Count>().expect("MSG_COUNT carries a Count payload");
    let chain = state.as_mut().unwrap().downcast_mut::<Chain>().unwrap();
    chain.limit = count.limit;
    chain.result = Arc::clone(&count.result);
    chain.current = count.current;

    *chain.result.lock().unwrap() *= chain.current;

    if count.last {
        cacti::send(cacti::self_id(), Message::new(MSG_CLEAR, Box::new(()))).unwrap();
    } else {
        cacti::send(cacti::self_id(), Message::spawn(child_role())).unwrap();
    }
}

/// Shared by both roles: propagate `CLEAR` up the chain, then self-`GODIE`.
fn clear_handler(state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    let chain = state.as_ref().unwrap().downcast_ref::<Chain>().unwrap();
    if !chain.first {
        cacti::send(chain.parent, Message::new(MSG_CLEAR, Box::new(()))).unwrap();
    }
    cacti::send(cacti::self_id(), Message::godie()).unwrap();
}

fn root_role() -> Arc<Role> {
    Arc::new(Role::new(vec![root_hello, unused, unused, callback_handler, clear_handler, root_init]))
}

fn child_role() -> Arc<Role> {
    Arc::new(Role::new(vec![child_hello, unused, unused, callback_handler, clear_handler, child_count]))
}

fn read_n() -> u64 {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input).expect("failed to read stdin");
    input.split_whitespace().next().expect("expected one integer on stdin").parse().expect("not a valid u64")
}

fn main() {
    tracing_subscriber::fmt::try_init().ok();

    let n = read_n();
    let result = Arc::new(Mutex::new(1u64));

    let (system, first) = ActorSystem::create(root_role()).expect("failed to start actor system");

    if n > 0 {
        system
            .send(first, Message::new(MSG_ROOT_INIT, Box::new(Init { target: n, result: Arc::clone(&result) })))
            .expect("root actor cannot be dead yet");
    } else {
        system.send(first, Message::new(MSG_CLEAR, Box::new(()))).expect("root actor cannot be dead yet");
    }

    system.join(first).expect("first actor id must be valid");

    println!("{}", *result.lock().unwrap());
}
