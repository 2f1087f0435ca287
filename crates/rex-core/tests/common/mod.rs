//! Test doubles: a sleeper that records requested delays and returns at once.

use rex_core::retry::{SleepFuture, Sleeper};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> SleepFuture {
        self.delays.lock().unwrap().push(delay);
        Box::pin(std::future::ready(()))
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
