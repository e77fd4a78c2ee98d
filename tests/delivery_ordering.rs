//! Property 2: two messages sent back-to-back from one sender, with no
//! intervening yield back to the scheduler, are observed by the target in
//! send order.
//!
//! Property 6: every spawned actor's first dispatched message is a `HELLO`
//! carrying its spawner's id.

use std::sync::{Arc, Mutex, OnceLock};

use cacti::{ActorId, ActorSystem, Message, Payload, Role, RuntimeConfig};

const RECORD: cacti::Kind = cacti::FIRST_USER_KIND;

static OBSERVED: OnceLock<Mutex<Vec<u32>>> = OnceLock::new();

fn observed() -> &'static Mutex<Vec<u32>> {
    OBSERVED.get().expect("initialized before the actor system starts")
}

fn unused(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    unreachable!("reserved message kind, never dispatched to a user handler")
}

fn noop(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {}

fn record(_state: &mut Option<Payload>, _nbytes: usize, data: Payload) {
    let tag = *data.downcast::<u32>().unwrap();
    observed().lock().unwrap().push(tag);
}

#[test]
fn messages_from_one_sender_arrive_in_send_order() {
    OBSERVED.set(Mutex::new(Vec::new())).unwrap_or_else(|_| panic!("initialized twice"));

    let role = Arc::new(Role::new(vec![noop, unused, unused, record]));
    let config = RuntimeConfig::new(1, 64, 64);
    let (system, first) = ActorSystem::create_with_config(role, config).unwrap();

    system.send(first, Message::new(RECORD, Box::new(1u32))).unwrap();
    system.send(first, Message::new(RECORD, Box::new(2u32))).unwrap();
    system.send(first, Message::new(RECORD, Box::new(3u32))).unwrap();

    system.send(first, Message::godie()).unwrap();
    system.join(first).unwrap();

    assert_eq!(*observed().lock().unwrap(), vec![1, 2, 3]);
}

static SPAWNER_SEEN: OnceLock<Mutex<Option<ActorId>>> = OnceLock::new();

fn capture_hello(_state: &mut Option<Payload>, _nbytes: usize, data: Payload) {
    let spawner = *data.downcast::<ActorId>().unwrap();
    *SPAWNER_SEEN.get().unwrap().lock().unwrap() = Some(spawner);
    cacti::send(cacti::self_id(), Message::godie()).unwrap();
}

fn child_role() -> Arc<Role> {
    Arc::new(Role::new(vec![capture_hello, unused, unused]))
}

/// On its own `HELLO`, spawns a child and immediately dies, proving the
/// child's `HELLO` payload is *this* actor's id and not its own spawner's.
fn spawn_child_on_hello(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    cacti::send(cacti::self_id(), Message::spawn(child_role())).unwrap();
    cacti::send(cacti::self_id(), Message::godie()).unwrap();
}

#[test]
fn spawned_actor_first_message_is_hello_from_its_spawner() {
    SPAWNER_SEEN.set(Mutex::new(None)).unwrap_or_else(|_| panic!("initialized twice"));

    let root_role = Arc::new(Role::new(vec![noop, unused, unused]));
    let config = RuntimeConfig::new(2, 64, 64);
    let (system, first) = ActorSystem::create_with_config(root_role, config).unwrap();

    let spawner_role = Arc::new(Role::new(vec![spawn_child_on_hello, unused, unused]));
    system.send(first, Message::spawn(spawner_role)).unwrap();
    system.send(first, Message::godie()).unwrap();
    system.join(first).unwrap();

    assert_eq!(*SPAWNER_SEEN.get().unwrap().lock().unwrap(), Some(1));
}
