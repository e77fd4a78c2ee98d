//! Sums each row of a `w × k` matrix by passing a running total along a
//! chain of `k` column actors, ported from `macierz.c` (spec.md §8 scenario
//! S2). Reads `w`, `k`, then `w * k` `(value, sleep_ms)` pairs from stdin
//! and prints one row sum per line.
//!
//! `macierz.c` keeps the matrix, sleep times, row sums and column-actor ids
//! in file-scope statics that every handler closes over implicitly. Rust's
//! handlers are plain `fn` pointers with no capture, so this driver gives
//! them the same thing explicitly: one process-wide [`OnceLock<Shared>`],
//! set once before the actor system starts and read by every handler
//! afterwards — the direct idiomatic translation of a driver-local global,
//! not a pattern `cacti` the library ever relies on.

use std::io::{self, Read};
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::Duration;

use cacti::{ActorId, ActorSystem, Kind, Message, Payload, Role};

struct Shared {
    w: usize,
    k: usize,
    matrix: Vec<i64>,
    sleep_ms: Vec<u64>,
    sums: Mutex<Vec<i64>>,
    /// Column actor ids, in spawn order; filled in as each actor's `HELLO`
    /// runs, one per column.
    ids: Mutex<Vec<ActorId>>,
}

static SHARED: OnceLock<Shared> = OnceLock::new();

fn shared() -> &'static Shared {
    SHARED.get().expect("Shared must be initialized before the actor system starts")
}

/// Carried from one column actor to the next: which row is being summed and
/// the running total so far.
struct RowState {
    row: usize,
    sum: i64,
}

const MSG_COUNT: Kind = 3;

fn unused(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    unreachable!("reserved message kind, never dispatched to a user handler")
}

/// Every column actor runs the same role; `hello_handler` registers this
/// actor's id and, once all `k` columns exist, kicks off row 0 by sending
/// the first `COUNT` to column 0.
fn hello_handler(_state: &mut Option<Payload>, _nbytes: usize, _data: Payload) {
    let shared = shared();
    let count = {
        let mut ids = shared.ids.lock().unwrap();
        ids.push(cacti::self_id());
        ids.len()
    };

    if count < shared.k {
        cacti::send(cacti::self_id(), Message::spawn(column_role())).expect("self-send never fails here");
        return;
    }

    let first_column = shared.ids.lock().unwrap()[0];
    cacti::send(first_column, Message::new(MSG_COUNT, Box::new(RowState { row: 0, sum: 0 })))
        .expect("column actors cannot be dead yet");
}

fn count_handler(_state: &mut Option<Payload>, _nbytes: usize, data: Payload) {
    let mut row_state = *data.downcast::<RowState>().expect("MSG_COUNT carries a RowState payload");
    let shared = shared();

    let column = shared
        .ids
        .lock()
        .unwrap()
        .iter()
        .position(|&id| id == cacti::self_id())
        .expect("every column actor registered its own id in hello_handler");

    let cell = row_state.row * shared.k + column;
    if shared.sleep_ms[cell] > 0 {
        thread::sleep(Duration::from_millis(shared.sleep_ms[cell]));
    }
    row_state.sum += shared.matrix[cell];
    shared.sums.lock().unwrap()[row_state.row] = row_state.sum;

    if column < shared.k - 1 {
        let next = shared.ids.lock().unwrap()[column + 1];
        cacti::send(next, Message::new(MSG_COUNT, Box::new(row_state))).expect("next column cannot be dead yet");
    } else if row_state.row < shared.w - 1 {
        row_state.row += 1;
        row_state.sum = 0;
        let first_column = shared.ids.lock().unwrap()[0];
        cacti::send(first_column, Message::new(MSG_COUNT, Box::new(row_state)))
            .expect("first column cannot be dead yet");
    } else {
        for &id in shared.ids.lock().unwrap().iter() {
            cacti::send(id, Message::godie()).expect("column actors cannot already be dead");
        }
    }
}

fn column_role() -> std::sync::Arc<Role> {
    std::sync::Arc::new(Role::new(vec![hello_handler, unused, unused, count_handler]))
}

struct Input {
    w: usize,
    k: usize,
    matrix: Vec<i64>,
    sleep_ms: Vec<u64>,
}

fn read_input() -> Input {
    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw).expect("failed to read stdin");
    let mut tokens = raw.split_whitespace().map(|tok| tok.parse::<i64>().expect("not a valid integer"));

    let w = tokens.next().expect("expected w") as usize;
    let k = tokens.next().expect("expected k") as usize;
    let mut matrix = Vec::with_capacity(w * k);
    let mut sleep_ms = Vec::with_capacity(w * k);
    for _ in 0..(w * k) {
        matrix.push(tokens.next().expect("expected a matrix value"));
        sleep_ms.push(tokens.next().expect("expected a sleep time") as u64);
    }
    Input { w, k, matrix, sleep_ms }
}

fn main() {
    tracing_subscriber::fmt::try_init().ok();

    let input = read_input();
    let w = input.w;
    SHARED
        .set(Shared {
            w,
            k: input.k,
            matrix: input.matrix,
            sleep_ms: input.sleep_ms,
            sums: Mutex::new(vec![0; w]),
            ids: Mutex::new(Vec::with_capacity(input.k)),
        })
        .unwrap_or_else(|_| panic!("Shared initialized twice"));

    let (system, first) = ActorSystem::create(column_role()).expect("failed to start actor system");
    system.join(first).expect("first actor id must be valid");

    for sum in shared().sums.lock().unwrap().iter() {
        println!("{sum}");
    }
}
