//! Page callbacks queued while the map is borrowed.
//!
//! Handlers registered from JS must be free to call back into the exported
//! API, so they never run under the map borrow. They are queued here and
//! drained by `run` once the borrow is gone.

use std::cell::RefCell;
use std::collections::VecDeque;

type Deferred = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Deferred>> = const { RefCell::new(VecDeque::new()) };
}

pub fn defer(f: impl FnOnce() + 'static) {
    QUEUE.with(|q| q.borrow_mut().push_back(Box::new(f)));
}

/// Drains the queue in FIFO order, including calls queued by the calls it
/// runs.
pub fn run() {
    while let Some(next) = QUEUE.with(|q| q.borrow_mut().pop_front()) {
        next();
    }
}

#[cfg(test)]
fn pending() -> usize {
    QUEUE.with(|q| q.borrow().len())
}

/// Borrows `cell` mutably for `f`, releases it, then drains the queue.
pub fn with_released<T, R>(
    cell: &RefCell<Option<T>>,
    f: impl FnOnce(&mut T) -> R,
) -> Result<R, &'static str> {
    let out = {
        let mut slot = cell.try_borrow_mut().map_err(|_| "map is busy")?;
        let value = slot.as_mut().ok_or("map is not initialised")?;
        f(value)
    };
    run();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn queued_calls_run_in_order_after_release() {
        let cell = Rc::new(RefCell::new(Some(Vec::<&str>::new())));
        let c = cell.clone();
        let out = with_released(&cell, move |log| {
            log.push("handler");
            let c2 = c.clone();
            defer(move || {
                with_released(&c2, |log| log.push("first")).expect("re-entry");
            });
            let c3 = c.clone();
            defer(move || {
                with_released(&c3, |log| log.push("second")).expect("re-entry");
            });
            log.len()
        });
        assert_eq!(out, Ok(1));
        assert_eq!(pending(), 0);
        assert_eq!(cell.borrow().clone(), Some(vec!["handler", "first", "second"]));
    }

    #[test]
    fn calls_queued_by_queued_calls_also_run() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let h = hits.clone();
        defer(move || {
            h.borrow_mut().push(1);
            let h2 = h.clone();
            defer(move || h2.borrow_mut().push(2));
        });
        run();
        assert_eq!(*hits.borrow(), vec![1, 2]);
    }

    #[test]
    fn borrow_conflicts_and_missing_state_are_errors() {
        let empty: RefCell<Option<u8>> = RefCell::new(None);
        assert_eq!(with_released(&empty, |_| ()), Err("map is not initialised"));

        let cell = RefCell::new(Some(1u8));
        let _held = cell.borrow_mut();
        assert_eq!(with_released(&cell, |_| ()), Err("map is busy"));
    }
}
