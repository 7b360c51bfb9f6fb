//! Background analysis scheduling
//!
//! Analysis runs cooperatively: the host's event loop calls
//! [`crate::Engine::run_background`] while the engine reports pending
//! work, and each call analyzes one batch. The batch size adapts so a
//! quantum takes roughly the configured time slice.

use std::time::Duration;

use crate::config::EngineConfig;

#[derive(Debug, Clone)]
pub struct Scheduler {
    batch_size: usize,
    minimum_batch: usize,
    time_slice: Duration,
    armed: bool,
}

impl Scheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            batch_size: config.initial_batch.max(config.minimum_batch),
            minimum_batch: config.minimum_batch,
            time_slice: config.time_slice,
            armed: false,
        }
    }

    /// Chars to analyze in the next quantum
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Schedule background work
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Drop any scheduled work
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    /// Size the next batch from the throughput of the last one
    pub fn record(&mut self, processed: usize, elapsed: Duration) {
        if processed == 0 {
            return;
        }
        let elapsed = elapsed.as_micros().max(1);
        let target = self.time_slice.as_micros();
        let next = (processed as u128 * target / elapsed).min(usize::MAX as u128) as usize;
        self.batch_size = next.max(self.minimum_batch);
        log::debug!(
            "analyzed {processed} chars in {elapsed}us, next batch {}",
            self.batch_size
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig {
            time_slice: Duration::from_millis(30),
            initial_batch: 40_960,
            minimum_batch: 10_240,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_initial_state() {
        let scheduler = Scheduler::new(&config());
        assert_eq!(scheduler.batch_size(), 40_960);
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn test_batch_grows_when_fast() {
        let mut scheduler = Scheduler::new(&config());
        scheduler.record(40_000, Duration::from_millis(10));
        assert_eq!(scheduler.batch_size(), 120_000);
    }

    #[test]
    fn test_batch_shrinks_to_floor() {
        let mut scheduler = Scheduler::new(&config());
        scheduler.record(40_000, Duration::from_millis(60));
        assert_eq!(scheduler.batch_size(), 20_000);
        scheduler.record(1_000, Duration::from_millis(300));
        assert_eq!(scheduler.batch_size(), 10_240);
    }

    #[test]
    fn test_idle_quantum_keeps_size() {
        let mut scheduler = Scheduler::new(&config());
        scheduler.record(0, Duration::from_millis(5));
        assert_eq!(scheduler.batch_size(), 40_960);
    }

    #[test]
    fn test_arm_and_cancel() {
        let mut scheduler = Scheduler::new(&config());
        scheduler.arm();
        assert!(scheduler.is_armed());
        scheduler.cancel();
        assert!(!scheduler.is_armed());
    }
}
