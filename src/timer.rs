use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed for the countdown started as `generation`.
    Tick { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No countdown is armed, or the tick belongs to a cancelled one.
    Ignored,
    Remaining(u32),
    Expired,
}

/// A per-question countdown driven by one-second ticks.
///
/// Each `start` opens a new generation; ticks carrying an older generation
/// are ignored, so a tick delivered after `cancel` can never expire the
/// next question.
#[derive(Debug, Default)]
pub struct Countdown {
    limit: u32,
    remaining: u32,
    generation: u64,
    armed: bool,
}

impl Countdown {
    pub fn start(&mut self, seconds: u32) -> u64 {
        debug_assert!(!self.armed, "countdown started twice without cancel");
        self.generation += 1;
        self.limit = seconds;
        self.remaining = seconds;
        self.armed = true;
        self.generation
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn tick(&mut self, generation: u64) -> Tick {
        if !self.armed || generation != self.generation {
            return Tick::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.armed = false;
            Tick::Expired
        } else {
            Tick::Remaining(self.remaining)
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self) -> u32 {
        self.limit - self.remaining
    }

    /// Fraction of the limit already used, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.limit == 0 {
            return 1.0;
        }
        f64::from(self.elapsed()) / f64::from(self.limit)
    }
}

/// Background thread that emits one tick per second for a single countdown
/// generation. Dropping the ticker stops the thread.
#[derive(Debug)]
pub struct Ticker {
    generation: u64,
    stop: Arc<AtomicBool>,
}

impl Ticker {
    pub fn spawn(generation: u64, tx: mpsc::Sender<TimerEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        thread::spawn(move || loop {
            thread::sleep(Duration::from_secs(1));
            if flag.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(TimerEvent::Tick { generation }).is_err() {
                break;
            }
        });

        Self { generation, stop }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub fn format_clock(total_secs: u32) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
