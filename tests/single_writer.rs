//! Property 1 (spec.md §8): for any actor, the interleaving of operations on
//! its state is a total order — no two handlers of the same actor overlap,
//! even when many threads hammer it with `send` concurrently.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, OnceLock};
use std::thread;

use cacti::{ActorSystem, Message, Payload, Role, RuntimeConfig};

const TICK: cacti::Kind = cacti::FIRST_USER_KIND;

struct Guard {
    busy: AtomicBool,
    violations: AtomicUsize,
    dispatches: AtomicUsize,
}

static GUARD: OnceLock<Guard> = OnceLock::new();

fn guard() -> &'static Guard {
    GUARD.get().expect("guard initialized before the actor system starts")
}

fn tick(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    let guard = guard();
    if guard.busy.swap(true, Ordering::SeqCst) {
        guard.violations.fetch_add(1, Ordering::SeqCst);
    }
    // Give a concurrent dispatch of the same actor a chance to interleave,
    // if the scheduler were (incorrectly) to allow one.
    thread::yield_now();
    guard.dispatches.fetch_add(1, Ordering::SeqCst);
    guard.busy.store(false, Ordering::SeqCst);
}

#[test]
fn one_actor_never_runs_two_handlers_at_once() {
    GUARD
        .set(Guard { busy: AtomicBool::new(false), violations: AtomicUsize::new(0), dispatches: AtomicUsize::new(0) })
        .unwrap_or_else(|_| panic!("guard initialized twice"));

    let role = Arc::new(Role::new(vec![
        tick, // HELLO, kind 0: harmless to also count as a dispatch
        tick, // placeholder for GODIE's slot; never invoked by the runtime
        tick, // placeholder for SPAWN's slot; never invoked by the runtime
        tick, // kind 3, the one user senders actually target
    ]));
    let config = RuntimeConfig::new(4, 256, 1024);
    let (system, first) = ActorSystem::create_with_config(role, config).unwrap();

    let senders = 8;
    let per_sender = 20;
    let barrier = Arc::new(Barrier::new(senders));
    let system = Arc::new(system);
    let handles: Vec<_> = (0..senders)
        .map(|_| {
            let system = Arc::clone(&system);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..per_sender {
                    // Queue-full is an acceptable outcome under contention;
                    // it is not the property under test here.
                    let _ = system.send(first, Message::new(TICK, Box::new(())));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let system = Arc::try_unwrap(system).unwrap_or_else(|_| panic!("senders still hold a reference"));
    system.send(first, Message::godie()).unwrap();
    system.join(first).unwrap();

    let guard = guard();
    assert_eq!(guard.violations.load(Ordering::SeqCst), 0);
    assert!(guard.dispatches.load(Ordering::SeqCst) >= 1);
}
