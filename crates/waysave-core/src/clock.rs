//! Injectable sleep for rate-limit pauses.
//!
//! The drivers pause between requests and on retry; tests substitute a
//! recording implementation so they run without real delays.

use std::time::Duration;

pub trait Sleep {
    fn sleep(&mut self, duration: Duration);
}

/// Real wall-clock sleep.
#[derive(Debug, Default)]
pub struct SystemSleep;

impl Sleep for SystemSleep {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
