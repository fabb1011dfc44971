//! Host capabilities the session depends on: frame scheduling, notifications and
//! score display, plus their terminal implementations.

use std::time::{Duration, Instant};

/// Result of asking the scheduler whether a frame is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePoll {
    /// Run a frame now. Timestamp is monotonic time since the scheduler started.
    Ready(Duration),
    /// Nothing due yet; the host may wait this long for input.
    Pending(Duration),
    /// Torn down; the loop should exit.
    Cancelled,
}

/// Cooperative, single-threaded frame source.
pub trait FrameScheduler {
    fn poll_frame(&mut self) -> FramePoll;
    fn cancel(&mut self);
}

/// Player-facing notice (game over).
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Receives the score after every clearing pass and after a reset.
pub trait ScoreDisplay {
    fn show_score(&mut self, score: u32, lines: u32);
}

/// Fixed-rate frames from the monotonic clock.
#[derive(Debug)]
pub struct TerminalFrames {
    start: Instant,
    period: Duration,
    next_due: Instant,
    /// Set after each frame so the host gets an input turn before the next one,
    /// even when frames run late.
    input_turn: bool,
    cancelled: bool,
}

impl TerminalFrames {
    pub fn new(frame_rate: f64) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            period: Duration::from_secs_f64(1.0 / frame_rate),
            next_due: now,
            input_turn: false,
            cancelled: false,
        }
    }
}

impl FrameScheduler for TerminalFrames {
    fn poll_frame(&mut self) -> FramePoll {
        if self.cancelled {
            return FramePoll::Cancelled;
        }
        let now = Instant::now();
        if now < self.next_due {
            self.input_turn = false;
            return FramePoll::Pending(self.next_due - now);
        }
        if std::mem::take(&mut self.input_turn) {
            return FramePoll::Pending(Duration::ZERO);
        }
        // Skip missed frames rather than bursting to catch up.
        self.next_due = (self.next_due + self.period).max(now);
        self.input_turn = true;
        FramePoll::Ready(now.duration_since(self.start))
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// How long a banner stays on screen.
pub const BANNER_DURATION: Duration = Duration::from_millis(2500);

/// Non-blocking on-screen notice; replaces a modal alert.
#[derive(Debug, Default)]
pub struct Banner {
    message: Option<(String, Instant)>,
    serial: u64,
}

impl Banner {
    /// Bumped on every notice, so renderers can restart per-notice effects.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Message and how long it has been shown, while it is still visible.
    pub fn visible(&self, now: Instant) -> Option<(&str, Duration)> {
        let (msg, shown_at) = self.message.as_ref()?;
        let age = now.saturating_duration_since(*shown_at);
        (age < BANNER_DURATION).then_some((msg.as_str(), age))
    }
}

impl Notifier for Banner {
    fn notify(&mut self, message: &str) {
        self.message = Some((message.to_string(), Instant::now()));
        self.serial += 1;
    }
}

/// Sidebar numbers as last reported by the session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u32,
    pub lines: u32,
    /// Highest score reached this run (not persisted).
    pub best: u32,
}

impl ScoreDisplay for Scoreboard {
    fn show_score(&mut self, score: u32, lines: u32) {
        self.score = score;
        self.lines = lines;
        self.best = self.best.max(score);
    }
}
