//! Periodic stepping at a chosen cadence.
//!
//! The scheduler is a single cooperative tick source. It never calls the
//! engine itself; the owner asks it how many ticks are due at `now` and
//! performs that many steps. At most one run is active at a time.

use std::time::{Duration, Instant};

use tracing::debug;

/// Named inter-step delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Normal,
    FastForward,
}

impl Cadence {
    pub fn label(self) -> &'static str {
        match self {
            Cadence::Normal => "normal",
            Cadence::FastForward => "fast",
        }
    }
}

/// Delay values behind each [`Cadence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadences {
    pub normal: Duration,
    pub fast_forward: Duration,
}

impl Cadences {
    pub const DEFAULT_NORMAL_MS: u64 = 25;
    pub const DEFAULT_FAST_FORWARD_MS: u64 = 1;

    pub fn from_millis(normal: u64, fast_forward: u64) -> Self {
        Self {
            normal: Duration::from_millis(normal),
            fast_forward: Duration::from_millis(fast_forward),
        }
    }

    pub fn delay(&self, cadence: Cadence) -> Duration {
        match cadence {
            Cadence::Normal => self.normal,
            Cadence::FastForward => self.fast_forward,
        }
    }
}

impl Default for Cadences {
    fn default() -> Self {
        Self::from_millis(Self::DEFAULT_NORMAL_MS, Self::DEFAULT_FAST_FORWARD_MS)
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveRun {
    cadence: Cadence,
    delay: Duration,
    next_tick: Instant,
}

/// Owns at most one active run.
#[derive(Debug, Clone)]
pub struct RunScheduler {
    active: Option<ActiveRun>,
    max_batch: usize,
}

impl RunScheduler {
    /// Upper bound on ticks fired by one call to [`RunScheduler::due_ticks`].
    pub const DEFAULT_MAX_BATCH: usize = 4096;

    /// Shortest delay honored; a zero delay is treated as this.
    const MIN_DELAY: Duration = Duration::from_micros(100);

    /// Longest delay honored, so deadlines stay representable.
    const MAX_DELAY: Duration = Duration::from_secs(3600);

    pub fn new() -> Self {
        Self {
            active: None,
            max_batch: Self::DEFAULT_MAX_BATCH,
        }
    }

    pub fn with_max_batch(max_batch: usize) -> Self {
        Self {
            active: None,
            max_batch: max_batch.max(1),
        }
    }

    /// Begin ticking every `delay`, starting one delay after `now`.
    /// Any active run is paused first.
    pub fn start(&mut self, cadence: Cadence, delay: Duration, now: Instant) {
        self.pause();
        let delay = delay.clamp(Self::MIN_DELAY, Self::MAX_DELAY);
        debug!(target: "scheduler", cadence = cadence.label(), ?delay, "start");
        self.active = Some(ActiveRun {
            cadence,
            delay,
            next_tick: now + delay,
        });
    }

    /// Stop ticking. Returns whether a run was active.
    pub fn pause(&mut self) -> bool {
        match self.active.take() {
            Some(run) => {
                debug!(target: "scheduler", cadence = run.cadence.label(), "pause");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn cadence(&self) -> Option<Cadence> {
        self.active.map(|run| run.cadence)
    }

    /// When the next tick falls due, if running.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.map(|run| run.next_tick)
    }

    /// Number of ticks elapsed up to `now`, consuming them.
    ///
    /// When more than `max_batch` ticks are owed, the batch is capped and the
    /// backlog dropped so the next tick is one delay after `now`.
    pub fn due_ticks(&mut self, now: Instant) -> usize {
        let Some(run) = self.active.as_mut() else {
            return 0;
        };
        if now < run.next_tick {
            return 0;
        }

        let behind = now.duration_since(run.next_tick);
        let owed = (behind.as_nanos() / run.delay.as_nanos()) + 1;
        if owed > self.max_batch as u128 {
            run.next_tick = now + run.delay;
            return self.max_batch;
        }

        let owed = owed as usize;
        run.next_tick += run.delay * owed as u32;
        owed
    }
}

impl Default for RunScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn idle_scheduler_owes_nothing() {
        let mut sched = RunScheduler::new();
        assert!(!sched.is_running());
        assert_eq!(sched.due_ticks(Instant::now()), 0);
        assert!(!sched.pause());
        assert!(!sched.pause());
    }

    #[test]
    fn first_tick_is_one_delay_after_start() {
        let t0 = Instant::now();
        let mut sched = RunScheduler::new();
        sched.start(Cadence::Normal, 25 * MS, t0);
        assert_eq!(sched.due_ticks(t0), 0);
        assert_eq!(sched.due_ticks(t0 + 24 * MS), 0);
        assert_eq!(sched.due_ticks(t0 + 25 * MS), 1);
        assert_eq!(sched.due_ticks(t0 + 25 * MS), 0);
        assert_eq!(sched.next_deadline(), Some(t0 + 50 * MS));
    }

    #[test]
    fn slow_polling_catches_up_in_one_batch() {
        let t0 = Instant::now();
        let mut sched = RunScheduler::new();
        sched.start(Cadence::FastForward, MS, t0);
        assert_eq!(sched.due_ticks(t0 + 33 * MS), 33);
        assert_eq!(sched.due_ticks(t0 + 34 * MS), 1);
    }

    #[test]
    fn backlog_beyond_batch_is_dropped() {
        let t0 = Instant::now();
        let mut sched = RunScheduler::with_max_batch(10);
        sched.start(Cadence::FastForward, MS, t0);
        assert_eq!(sched.due_ticks(t0 + 500 * MS), 10);
        assert_eq!(sched.next_deadline(), Some(t0 + 501 * MS));
    }

    #[test]
    fn restarting_replaces_the_active_run() {
        let t0 = Instant::now();
        let mut sched = RunScheduler::new();
        sched.start(Cadence::Normal, 25 * MS, t0);
        sched.start(Cadence::FastForward, MS, t0);
        assert_eq!(sched.cadence(), Some(Cadence::FastForward));
        assert_eq!(sched.due_ticks(t0 + 25 * MS), 25);
    }

    #[test]
    fn pause_takes_effect_before_the_next_tick() {
        let t0 = Instant::now();
        let mut sched = RunScheduler::new();
        sched.start(Cadence::Normal, 25 * MS, t0);
        assert!(sched.pause());
        assert_eq!(sched.due_ticks(t0 + 100 * MS), 0);
        assert_eq!(sched.cadence(), None);
    }

    #[test]
    fn oversized_delay_is_capped() {
        let t0 = Instant::now();
        let mut sched = RunScheduler::new();
        sched.start(Cadence::Normal, Duration::from_millis(u64::MAX), t0);
        assert_eq!(sched.next_deadline(), Some(t0 + RunScheduler::MAX_DELAY));
        assert_eq!(sched.due_ticks(t0 + 25 * MS), 0);
    }

    #[test]
    fn cadences_map_to_configured_delays() {
        let cadences = Cadences::default();
        assert_eq!(cadences.delay(Cadence::Normal), 25 * MS);
        assert_eq!(cadences.delay(Cadence::FastForward), MS);
    }
}
