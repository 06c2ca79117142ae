//! Browser-side controller for the profile catalog.
//!
//! The host writes bytes into the input buffer (see [`input_ptr`]) and then
//! calls [`load`], [`reduce`] or [`tick`]. Each call re-renders the snapshot;
//! read it back with [`snapshot_ptr`] and [`snapshot_len`]. Times are
//! milliseconds since the host's clock origin (`performance.now()`).

use std::cell::RefCell;
use std::time::Duration;

use catalog_core::{process, snapshot, Controller, ControllerConfig, Feed, Outcome};

struct Globals {
    controller: Controller,
    input: Vec<u8>,
    out: Vec<u8>,
}

thread_local! {
    static G: RefCell<Globals> = RefCell::new(Globals {
        controller: Controller::new(ControllerConfig::default()),
        input: Vec::new(),
        out: Vec::new(),
    });
}

fn millis(now_ms: f64) -> Duration {
    if now_ms.is_finite() && now_ms > 0.0 {
        Duration::from_micros((now_ms * 1000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

fn write_snapshot(g: &mut Globals) {
    g.out = serde_json::to_vec(&snapshot(&g.controller)).unwrap_or_default();
}

/// 1 when the view changed, 0 when it did not, and -1 when a search is pending.
fn outcome_code(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Recomputed => 1,
        Outcome::Unchanged => 0,
        Outcome::Deferred { .. } => -1,
    }
}

/// Make room for `cap` bytes of input and return where to write them.
#[no_mangle]
pub extern "C" fn input_ptr(cap: u32) -> *mut u8 {
    G.with(|g| {
        let mut g = g.borrow_mut();
        g.input.resize(cap as usize, 0);
        g.input.as_mut_ptr()
    })
}

/// Render the initial (loading) snapshot.
#[no_mangle]
pub extern "C" fn init() -> u32 {
    G.with(|g| {
        let mut g = g.borrow_mut();
        write_snapshot(&mut g);
        g.out.len() as u32
    })
}

/// Install the feed JSON held in the input buffer. A feed that does not
/// decode puts the controller into its error state.
#[no_mangle]
pub extern "C" fn load(len: u32) -> u32 {
    G.with(|g| {
        let mut g = g.borrow_mut();
        let g = &mut *g;
        let end = (len as usize).min(g.input.len());
        let result = std::str::from_utf8(&g.input[..end])
            .map_err(|e| e.to_string())
            .and_then(|json| Feed::from_json(json).map_err(|e| e.to_string()));
        g.controller.load(result);
        write_snapshot(g);
        g.out.len() as u32
    })
}

/// Process the action held in the input buffer.
#[no_mangle]
pub extern "C" fn reduce(len: u32, now_ms: f64) -> i32 {
    G.with(|g| {
        let mut g = g.borrow_mut();
        let g = &mut *g;
        let end = (len as usize).min(g.input.len());
        let (outcome, snap) = process(&mut g.controller, &g.input[..end], millis(now_ms));
        g.out = serde_json::to_vec(&snap).unwrap_or_default();
        outcome_code(outcome)
    })
}

/// Apply a pending search if it is due.
#[no_mangle]
pub extern "C" fn tick(now_ms: f64) -> i32 {
    G.with(|g| {
        let mut g = g.borrow_mut();
        let outcome = g.controller.tick(millis(now_ms));
        if outcome == Outcome::Recomputed {
            write_snapshot(&mut g);
        }
        outcome_code(outcome)
    })
}

/// Milliseconds at which [`tick`] should next be called, or -1.
#[no_mangle]
pub extern "C" fn next_deadline_ms() -> f64 {
    G.with(|g| {
        g.borrow()
            .controller
            .next_deadline()
            .map(|d| d.as_micros() as f64 / 1000.0)
            .unwrap_or(-1.0)
    })
}

#[no_mangle]
pub extern "C" fn snapshot_ptr() -> *const u8 {
    G.with(|g| g.borrow().out.as_ptr())
}

#[no_mangle]
pub extern "C" fn snapshot_len() -> u32 {
    G.with(|g| g.borrow().out.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_input(bytes: &[u8]) -> u32 {
        G.with(|g| {
            let mut g = g.borrow_mut();
            g.input.clear();
            g.input.extend_from_slice(bytes);
        });
        bytes.len() as u32
    }

    fn out() -> String {
        G.with(|g| String::from_utf8(g.borrow().out.clone()).unwrap())
    }

    #[test]
    fn test_load_then_search_and_tick() {
        assert!(init() > 0);
        assert!(out().contains("Loading"));

        let len = write_input(br#"{"profiles":[{"id":"1","avatarName":"Rusk"},{"id":"2","avatarName":"Mizuki"}]}"#);
        load(len);
        assert!(out().contains("2 / 2 items"));

        let len = write_input(br#"{"action":"search_input","payload":{"value":"rusk"}}"#);
        assert_eq!(reduce(len, 1000.0), -1);
        assert_eq!(next_deadline_ms(), 1300.0);
        assert_eq!(tick(1200.0), -1);
        assert_eq!(tick(1300.0), 1);
        assert!(out().contains("1 / 2 items"));
        assert_eq!(next_deadline_ms(), -1.0);
    }

    #[test]
    fn test_bad_feed_shows_error() {
        let len = write_input(b"{\"lastUpdated\":\"x\"}");
        load(len);
        assert!(out().contains("could not be loaded"));
    }
}
