// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{collections::VecDeque, sync::Arc, thread, time::Duration};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, span, warn, Level};

use crate::{
    timeline::{Timeline, TimelineEntry},
    transport::Transport,
    util::{duration_until, epoch_seconds},
};


/// The timing constants of a scheduler. They are fixed for the lifetime of the
/// scheduler and never vary per submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    /// Entries must be at least this far ahead of now to be accepted.
    pub grace_window: Duration,
    /// How long a newly spawned delivery thread waits before delivering,
    /// giving the fixture bus time to settle.
    pub warm_up: Duration,
    /// How long an exhausted delivery thread lingers after marking itself
    /// inactive.
    pub idle_grace: Duration,
    /// How long to pause after the transport fails.
    pub failure_backoff: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            grace_window: Duration::from_millis(250),
            warm_up: Duration::from_secs(2),
            idle_grace: Duration::from_millis(150),
            failure_backoff: Duration::from_secs(2),
        }
    }
}

/// Running totals, mostly useful for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Entries handed to submit.
    pub submitted: usize,
    /// Entries that survived the grace window.
    pub accepted: usize,
    /// Entries written to the transport.
    pub delivered: usize,
    /// Stale entries skipped while catching up after a preemption.
    pub skipped: usize,
    /// Entries lost to a transport failure.
    pub failed: usize,
    /// Delivery threads started.
    pub spawned: usize,
}

/// Everything guarded by the scheduler lock.
struct State {
    /// Entries still to be delivered, soonest first.
    pending: VecDeque<TimelineEntry>,
    /// True while a delivery thread is running. Only read or written under the
    /// lock, so there is never more than one delivery thread.
    active: bool,
    /// Set by every submission and cleared by the next pop. While set, entries
    /// that are already due are skipped instead of delivered late.
    just_preempted: bool,
    stats: Stats,
}

struct Shared {
    state: Mutex<State>,
    /// Notified whenever the delivery thread goes idle.
    idle: Condvar,
    /// Only ever locked by the delivery thread, outside of the state lock.
    transport: Mutex<Box<dyn Transport>>,
    timings: Timings,
}

/// Plays timelines out to the fixture bus in real time.
///
/// At most one timeline is live at once. Each submission replaces whatever is
/// still pending, and a single background thread delivers entries as their
/// time comes. The thread is started on demand and exits once it runs out of
/// entries. Cloning the scheduler yields another handle to the same one.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    /// Creates a scheduler writing to the given transport with default timings.
    pub fn new<T: Transport + 'static>(transport: T) -> Scheduler {
        Scheduler::with_timings(transport, Timings::default())
    }

    /// Creates a scheduler with the given timings.
    pub fn with_timings<T: Transport + 'static>(transport: T, timings: Timings) -> Scheduler {
        Scheduler {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    pending: VecDeque::new(),
                    active: false,
                    just_preempted: false,
                    stats: Stats::default(),
                }),
                idle: Condvar::new(),
                transport: Mutex::new(Box::new(transport)),
                timings,
            }),
        }
    }

    pub fn timings(&self) -> Timings {
        self.shared.timings
    }

    /// Replaces everything pending with the given timeline.
    ///
    /// Entries that aren't strictly later than now plus the grace window are
    /// dropped, as are entries too far ahead to wait for. An empty timeline
    /// stops everything that's scheduled. Nothing is ever reported back;
    /// failures only show up as missing output.
    pub fn submit(&self, timeline: Timeline) {
        let mut state = self.shared.state.lock();

        let submitted = timeline.len();
        let cutoff = epoch_seconds() + self.shared.timings.grace_window.as_secs_f64();
        let pending: VecDeque<TimelineEntry> = Timeline::from_entries(timeline.into_entries())
            .into_iter()
            .filter(|entry| entry.time > cutoff && duration_until(entry.time).is_some())
            .collect();

        info!(
            submitted,
            accepted = pending.len(),
            dropped = submitted - pending.len(),
            superseded = state.pending.len(),
            "Timeline submitted."
        );

        state.stats.submitted += submitted;
        state.stats.accepted += pending.len();
        state.pending = pending;
        state.just_preempted = true;

        if !state.active {
            let shared = self.shared.clone();
            let spawned = thread::Builder::new()
                .name("discofy-delivery".into())
                .spawn(move || shared.deliver());
            match spawned {
                Ok(_) => {
                    debug!("Started delivery thread.");
                    state.active = true;
                    state.stats.spawned += 1;
                }
                Err(e) => error!(err = e.to_string(), "Unable to start delivery thread."),
            }
        }
    }

    /// Returns true while a delivery thread is running.
    pub fn is_active(&self) -> bool {
        self.shared.state.lock().active
    }

    /// The number of entries not yet delivered.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    pub fn stats(&self) -> Stats {
        self.shared.state.lock().stats
    }

    /// Blocks until no delivery thread is running or the timeout passes.
    /// Returns true if the scheduler is idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let mut state = self.shared.state.lock();
        let _ = self
            .shared
            .idle
            .wait_while_for(&mut state, |state| state.active, timeout);
        !state.active
    }
}

/// Marks the scheduler idle if the delivery thread unwinds, so that the next
/// submission starts a fresh one.
struct UnwindGuard<'a> {
    shared: &'a Shared,
}

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("Delivery thread panicked, going idle.");
            self.shared.state.lock().active = false;
            self.shared.idle.notify_all();
        }
    }
}

impl Shared {
    /// The delivery loop. Runs on its own thread until the pending queue is
    /// exhausted.
    fn deliver(&self) {
        let span = span!(Level::INFO, "delivery");
        let _enter = span.enter();
        let _guard = UnwindGuard { shared: self };

        debug!(
            warm_up = self.timings.warm_up.as_secs_f64(),
            "Delivery thread started, warming up."
        );
        // The queue may be replaced while we wait; we only look at it afterwards.
        thread::sleep(self.timings.warm_up);
        debug!("Warm-up done.");

        loop {
            let entry = match self.next_entry() {
                Some(entry) => entry,
                None => {
                    info!("Nothing left to deliver, going idle.");
                    thread::sleep(self.timings.idle_grace);
                    return;
                }
            };

            // The wait isn't interrupted by a new submission. A superseded entry
            // that is already being waited on still fires.
            match duration_until(entry.time) {
                Some(wait) => spin_sleep::sleep(wait),
                None => {
                    warn!(time = entry.time, "Entry is too far ahead to wait for, dropping.");
                    continue;
                }
            }

            let result = self.transport.lock().write(&entry.state);
            match result {
                Ok(()) => {
                    debug!(time = entry.time, state = %entry.state, "Delivered.");
                    self.state.lock().stats.delivered += 1;
                }
                Err(e) => {
                    warn!(
                        err = e.to_string(),
                        backoff = self.timings.failure_backoff.as_secs_f64(),
                        "Error writing to the fixture bus, backing off."
                    );
                    self.state.lock().stats.failed += 1;
                    thread::sleep(self.timings.failure_backoff);
                }
            }
        }
    }

    /// Pops the next entry to deliver. Right after a preemption, entries that
    /// are already due are skipped to catch up with the clock; otherwise an
    /// overdue entry is delivered late. Marks the scheduler inactive and
    /// returns None once the queue is exhausted.
    fn next_entry(&self) -> Option<TimelineEntry> {
        let mut state = self.state.lock();

        let mut skipped = 0;
        let next = loop {
            match state.pending.pop_front() {
                Some(entry) if state.just_preempted && entry.time < epoch_seconds() => {
                    skipped += 1;
                }
                next => break next,
            }
        };
        state.just_preempted = false;

        if skipped > 0 {
            info!(skipped, "Skipped stale entries after a preemption.");
            state.stats.skipped += skipped;
        }

        if next.is_none() {
            state.active = false;
            self.idle.notify_all();
        }
        next
    }
}
