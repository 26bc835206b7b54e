//! Data-carrying timer queue.
//!
//! Timers hold the action to report instead of a callback, so the owner decides
//! what a firing means and every pending timer can be dropped in one call.

use std::time::Duration;

/// Whether a timer re-arms after firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Fires every `delay` until cancelled.
    Forever,
    /// Fires once and is removed.
    Once,
}

/// Action reported by a timer, with how long ago it fell due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Firing<A> {
    /// Action the timer was armed with.
    pub action: A,
    /// Time between the due instant and the end of the advance that reported it.
    pub late: Duration,
}

#[derive(Clone, Debug)]
struct Timer<A> {
    delay: Duration,
    elapsed: Duration,
    repeat: Repeat,
    finished: bool,
    action: A,
}

/// Pending timers in the order they were armed.
#[derive(Clone, Debug)]
pub struct TimerQueue<A> {
    timers: Vec<Timer<A>>,
}

impl<A: Clone> TimerQueue<A> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self { timers: Vec::new() }
    }

    /// Arms a timer that reports `action` every `delay`.
    pub fn every(&mut self, delay: Duration, action: A) {
        self.arm(delay, Repeat::Forever, action);
    }

    /// Arms a timer that reports `action` once after `delay`.
    pub fn after(&mut self, delay: Duration, action: A) {
        self.after_elapsed(delay, Duration::ZERO, action);
    }

    /// Arms a one-shot timer that started counting `elapsed` ago.
    ///
    /// A timer whose `elapsed` already covers `delay` fires on the next advance.
    pub fn after_elapsed(&mut self, delay: Duration, elapsed: Duration, action: A) {
        self.timers.push(Timer {
            delay,
            elapsed,
            repeat: Repeat::Once,
            finished: false,
            action,
        });
    }

    fn arm(&mut self, delay: Duration, repeat: Repeat, action: A) {
        self.timers.push(Timer {
            delay,
            elapsed: Duration::ZERO,
            repeat,
            finished: false,
            action,
        });
    }

    /// Drops every pending timer without reporting it.
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Reports whether no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advances every timer by `dt` and appends due firings to `fired`.
    ///
    /// Firings are ordered by the instant they fell due within `dt`; timers due
    /// at the same instant keep the order they were armed in. A repeating timer
    /// fires once for every whole `delay` covered by `dt`, except a zero-delay
    /// one, which fires once per call.
    pub fn advance(&mut self, dt: Duration, fired: &mut Vec<Firing<A>>) {
        let mut due: Vec<(Duration, usize, Duration, A)> = Vec::new();

        for (order, timer) in self.timers.iter_mut().enumerate() {
            timer.elapsed = timer.elapsed.saturating_add(dt);
            while !timer.finished && timer.elapsed >= timer.delay {
                let overshoot = timer.elapsed - timer.delay;
                due.push((
                    dt.saturating_sub(overshoot),
                    order,
                    overshoot,
                    timer.action.clone(),
                ));

                match timer.repeat {
                    Repeat::Once => timer.finished = true,
                    Repeat::Forever if timer.delay.is_zero() => break,
                    Repeat::Forever => timer.elapsed = overshoot,
                }
            }
        }

        self.timers.retain(|timer| !timer.finished);
        due.sort_by_key(|(instant, order, _, _)| (*instant, *order));
        fired.extend(
            due.into_iter()
                .map(|(_, _, late, action)| Firing { action, late }),
        );
    }
}

impl<A: Clone> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
