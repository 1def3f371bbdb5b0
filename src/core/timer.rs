/// Virtual-time timers for the gesture, lip-sync and blink schedulers.
///
/// Time only moves when the engine ticks. Due timers are popped one at a
/// time in chronological order so each firing observes the clock at its own
/// due time.

/// Opaque handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer drives when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Gesture,
    LipSync,
    Blink,
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    /// Virtual time the timer was due at.
    pub at: f64,
}

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    kind: TimerKind,
    due: f64,
    period: Option<f64>,
}

/// Smallest period a repeating timer may have, and the shortest delay a
/// one-shot may have. A timer that re-arms itself from its own firing
/// always lands strictly in the future.
const MIN_PERIOD: f64 = 1e-3;

#[derive(Debug, Clone, Default)]
pub struct Timers {
    now: f64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Fire once, `delay` seconds from now.
    pub fn schedule_once(&mut self, kind: TimerKind, delay: f64) -> TimerId {
        self.push(kind, delay.max(MIN_PERIOD), None)
    }

    /// Fire every `period` seconds, first firing one period from now.
    pub fn schedule_repeating(&mut self, kind: TimerKind, period: f64) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.push(kind, period, Some(period))
    }

    fn push(&mut self, kind: TimerKind, delay: f64, period: Option<f64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kind,
            due: self.now + delay,
            period,
        });
        id
    }

    /// Cancel a timer. Returns false if it had already fired or been
    /// cancelled; cancelling twice is harmless.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Number of live timers of the given kind.
    pub fn active_count(&self, kind: TimerKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pop the earliest timer due at or before `target`, moving the clock to
    /// its due time. Repeating timers are rescheduled, one-shots removed.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, target: f64) -> Option<Fired> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= target)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[idx];
        let fired = Fired {
            id: entry.id,
            kind: entry.kind,
            at: entry.due,
        };
        self.now = self.now.max(entry.due);
        match entry.period {
            Some(period) => entry.due += period,
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some(fired)
    }

    /// Move the clock forward to `target` once nothing else is due.
    pub fn settle(&mut self, target: f64) {
        self.now = self.now.max(target);
    }
}

/// Holds at most one live timer on behalf of a scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerSlot {
    handle: Option<TimerId>,
}

impl TimerSlot {
    /// Store `id`, cancelling whatever timer the slot held before.
    pub fn replace(&mut self, timers: &mut Timers, id: TimerId) {
        if let Some(old) = self.handle.replace(id) {
            if old != id {
                timers.cancel(old);
            }
        }
    }

    pub fn cancel(&mut self, timers: &mut Timers) {
        if let Some(id) = self.handle.take() {
            timers.cancel(id);
        }
    }

    pub fn is_active(&self, timers: &Timers) -> bool {
        self.handle.map_or(false, |id| timers.is_active(id))
    }

    /// Whether `id` is the timer this slot holds.
    pub fn is(&self, id: TimerId) -> bool {
        self.handle == Some(id)
    }

    /// Forget the handle without touching the queue; used once a one-shot
    /// has fired.
    pub fn release(&mut self) {
        self.handle = None;
    }
}
