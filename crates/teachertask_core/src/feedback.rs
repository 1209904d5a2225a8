use rand::seq::SliceRandom;
use std::time::{Duration, Instant};

pub const FEEDBACK_DURATION: Duration = Duration::from_millis(2000);
pub const FEEDBACK_MESSAGES: [&str; 3] = ["Done.", "Completed.", "Task finished."];

pub fn pick_message() -> &'static str {
    FEEDBACK_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FEEDBACK_MESSAGES[0])
}

/// Short-lived completion message. Showing a new message while one is
/// visible replaces it and restarts the timer.
#[derive(Debug, Clone)]
pub struct Feedback {
    duration: Duration,
    current: Option<(String, Instant)>,
}

impl Default for Feedback {
    fn default() -> Self {
        Self::new(FEEDBACK_DURATION)
    }
}

impl Feedback {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Changes how long messages stay live, including the one showing now.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn show<M: Into<String>>(&mut self, message: M, now: Instant) {
        self.current = Some((message.into(), now));
    }

    pub fn current(&self, now: Instant) -> Option<&str> {
        match self.current.as_ref() {
            Some((message, shown_at)) if now.saturating_duration_since(*shown_at) < self.duration => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    pub fn clear_expired(&mut self, now: Instant) {
        if self.current(now).is_none() {
            self.current = None;
        }
    }
}
