//! Property 3 / spec.md §8 scenario S3: sending `ACTOR_QUEUE_LIMIT + 1`
//! messages to a non-draining actor returns `-3` on the final send, every
//! earlier send succeeds, and all accepted messages are eventually
//! processed once the actor starts draining.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use cacti::{ActorSystem, Message, Payload, Role, RuntimeConfig, SendError};

const WORK: cacti::Kind = cacti::FIRST_USER_KIND;

static PROCESSED: OnceLock<AtomicUsize> = OnceLock::new();

fn processed() -> &'static AtomicUsize {
    PROCESSED.get().expect("initialized before the actor system starts")
}

fn unused(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    unreachable!("reserved message kind, never dispatched to a user handler")
}

fn noop(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {}

/// Sleeps on the very first message so the mailbox has a chance to fill up
/// behind it before anything drains, mirroring S3's "sleeps 100ms on the
/// first message" driver handler.
fn slow_worker(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    let count = processed().fetch_add(1, Ordering::SeqCst);
    if count == 0 {
        thread::sleep(Duration::from_millis(100));
    }
}

#[test]
fn queue_full_on_the_last_send_then_full_drain() {
    PROCESSED.set(AtomicUsize::new(0)).unwrap_or_else(|_| panic!("initialized twice"));

    const LIMIT: usize = 8;
    let role = Arc::new(Role::new(vec![noop, unused, unused, slow_worker]));
    let config = RuntimeConfig::new(1, LIMIT, 64);
    let (system, first) = ActorSystem::create_with_config(role, config).unwrap();

    let mut results = Vec::new();
    for _ in 0..(LIMIT + 1) {
        results.push(system.send(first, Message::new(WORK, Box::new(()))));
    }

    let (last, earlier) = results.split_last().unwrap();
    assert!(earlier.iter().all(|r| r.is_ok()), "all but the last send must succeed");
    assert_eq!(*last, Err(SendError::QueueFull));

    // Give the slow first dispatch + the rest of the drain time to finish,
    // then confirm every accepted message was processed (not dropped).
    thread::sleep(Duration::from_millis(300));
    assert_eq!(processed().load(Ordering::SeqCst), LIMIT);

    system.send(first, Message::godie()).unwrap();
    system.join(first).unwrap();
}
