//! Debounced edge redraw.
//!
//! Layout-affecting events (resize, scroll, content mutation) arrive in
//! bursts; each one restarts a single pending timer, and only the timer that
//! survives the quiet window triggers a redraw.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::layout::{EdgeReport, Surface, draw_edges};
use crate::model::Relationship;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// One-shot cancellable timers. Firing is reported out of band by the
/// implementation (see [`ManualTimer::advance`] and [`TokioTimer::new`]).
pub trait Timer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Virtual clock for driving timers by hand.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: Duration,
    next_id: u64,
    scheduled: Vec<(TimerHandle, Duration)>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.scheduled.len()
    }

    /// Moves the clock forward and returns the timers that came due, earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerHandle> {
        self.now += by;
        let now = self.now;
        let mut due: Vec<(TimerHandle, Duration)> = Vec::new();
        self.scheduled.retain(|&(handle, at)| {
            if at <= now {
                due.push((handle, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(handle, at)| (at, handle));
        due.into_iter().map(|(handle, _)| handle).collect()
    }
}

impl Timer for ManualTimer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.scheduled.push((handle, self.now + delay));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.scheduled.retain(|(h, _)| *h != handle);
    }
}

/// Timers backed by tokio tasks; fired handles are delivered on the channel
/// returned by [`TokioTimer::new`].
pub struct TokioTimer {
    next_id: u64,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
    fired: mpsc::UnboundedSender<TimerHandle>,
}

impl TokioTimer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerHandle>) {
        let (fired, rx) = mpsc::unbounded_channel();
        let timer = Self {
            next_id: 0,
            tasks: HashMap::new(),
            fired,
        };
        (timer, rx)
    }
}

impl Timer for TokioTimer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.tasks.retain(|_, task| !task.is_finished());
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let fired = self.fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired.send(handle);
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

/// Keeps at most one pending timer alive.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<TimerHandle>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancels the pending timer, if any, and starts a fresh one.
    pub fn trigger<T: Timer + ?Sized>(&mut self, timer: &mut T) -> TimerHandle {
        if let Some(previous) = self.pending.take() {
            timer.cancel(previous);
        }
        let handle = timer.schedule(self.delay);
        self.pending = Some(handle);
        handle
    }

    /// True when `handle` is the live timer; it is consumed.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        if let Some(handle) = self.pending.take() {
            timer.cancel(handle);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    Resize,
    Scroll,
    ContentMutation,
}

pub struct EdgeRedrawer<T: Timer> {
    timer: T,
    debouncer: Debouncer,
    redraws: usize,
}

impl<T: Timer> EdgeRedrawer<T> {
    pub fn new(timer: T, delay: Duration) -> Self {
        Self {
            timer,
            debouncer: Debouncer::new(delay),
            redraws: 0,
        }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn redraws(&self) -> usize {
        self.redraws
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn notify(&mut self, event: LayoutEvent) -> TimerHandle {
        let handle = self.debouncer.trigger(&mut self.timer);
        trace!(?event, timer = handle.0, "edge redraw scheduled");
        handle
    }

    /// Redraws when `handle` is the surviving timer; stale handles are ignored.
    pub fn on_timer<S: Surface + ?Sized>(
        &mut self,
        handle: TimerHandle,
        relationships: &[Relationship],
        surface: &mut S,
        theme: &Theme,
    ) -> Option<EdgeReport> {
        if !self.debouncer.fire(handle) {
            trace!(timer = handle.0, "stale redraw timer ignored");
            return None;
        }
        Some(self.redraw_now(relationships, surface, theme))
    }

    pub fn redraw_now<S: Surface + ?Sized>(
        &mut self,
        relationships: &[Relationship],
        surface: &mut S,
        theme: &Theme,
    ) -> EdgeReport {
        self.debouncer.cancel(&mut self.timer);
        self.redraws += 1;
        let report = draw_edges(relationships, surface, theme);
        debug!(
            redraw = self.redraws,
            drawn = report.drawn,
            skipped = report.skipped.len(),
            "edges redrawn"
        );
        report
    }
}
