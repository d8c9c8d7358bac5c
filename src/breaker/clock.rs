use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Time source for the breaker state machine.
///
/// Injected so transition logic stays deterministic under test: recovery
/// windows are exercised by advancing a mock instead of sleeping.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time as milliseconds since the UNIX epoch
    fn now_millis(&self) -> u64;
}

/// Wall-clock time source used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced time source for tests
#[derive(Debug, Default)]
pub struct MockClock {
    millis: AtomicU64,
}

impl MockClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(start_millis),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Pin the clock to an absolute value
    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}
