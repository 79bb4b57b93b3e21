//! Deferred and repeating timers on the frame clock
//!
//! Timers are plain data: the owner advances the clock and pops due events
//! one at a time, so handling an event can cancel or schedule other timers
//! before the next one is popped. The clock is `f64` so long sessions keep
//! millisecond resolution.

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Timer<E> {
    handle: TimerHandle,
    due: f64,
    interval: Option<f64>,
    event: E,
}

/// Single-threaded timer queue
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now: f64,
    /// Due time of the most recently popped timer
    last_due: f64,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            now: 0.0,
            last_due: 0.0,
            next_id: 1,
            timers: Vec::new(),
        }
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock time in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Seconds the last popped timer fired after its due time
    pub fn lateness(&self) -> f32 {
        (self.now - self.last_due).max(0.0) as f32
    }

    /// Fire `event` once, `delay` seconds from now
    pub fn after(&mut self, delay: f32, event: E) -> TimerHandle {
        self.schedule(delay, None, event)
    }

    /// Fire `event` after `delay`, then every `interval` seconds until cancelled
    pub fn every(&mut self, delay: f32, interval: f32, event: E) -> TimerHandle {
        self.schedule(delay, Some(f64::from(interval.max(f32::EPSILON))), event)
    }

    fn schedule(&mut self, delay: f32, interval: Option<f64>, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            due: self.now + f64::from(delay.max(0.0)),
            interval,
            event,
        });
        handle
    }

    /// Retract a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock forward
    pub fn advance(&mut self, dt: f32) {
        self.now += f64::from(dt.max(0.0));
    }

    /// Pop the earliest due timer (ties in scheduling order). Repeating
    /// timers are re-armed one interval later.
    pub fn pop_due(&mut self) -> Option<(TimerHandle, E)> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= self.now)
            .min_by(|(_, a), (_, b)| {
                a.due
                    .partial_cmp(&b.due)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.handle.0.cmp(&b.handle.0))
            })
            .map(|(i, _)| i)?;

        let timer = &self.timers[idx];
        let fired = (timer.handle, timer.event.clone());
        self.last_due = timer.due;
        let interval = timer.interval;
        match interval {
            Some(interval) => self.timers[idx].due += interval,
            None => {
                self.timers.remove(idx);
            }
        }
        Some(fired)
    }
}
