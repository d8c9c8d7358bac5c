/// Fixed-capacity ring buffer of call outcomes (`true` = success).
///
/// Push is O(1): once the window is full the oldest outcome is overwritten.
/// The failure count is maintained incrementally so the failure rate never
/// requires a scan.
#[derive(Debug, Clone)]
pub struct OutcomeWindow {
    slots: Box<[bool]>,
    /// Index of the next slot to write; wraps around capacity
    head: usize,
    len: usize,
    failures: usize,
}

impl OutcomeWindow {
    /// Create a window tracking up to `capacity` outcomes. Capacity must be
    /// non-zero; configuration validation enforces this upstream.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![false; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
            failures: 0,
        }
    }

    /// Record one outcome, evicting the oldest when the window is full
    pub fn push(&mut self, success: bool) {
        if self.len == self.slots.len() {
            // The slot under head holds the oldest outcome
            if !self.slots[self.head] {
                self.failures -= 1;
            }
        } else {
            self.len += 1;
        }

        self.slots[self.head] = success;
        if !success {
            self.failures += 1;
        }
        self.head = (self.head + 1) % self.slots.len();
    }

    /// Forget all recorded outcomes
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
        self.failures = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Share of failures among recorded outcomes, in percent. An empty
    /// window reports 0.0.
    pub fn failure_rate(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        (self.failures as f64) * 100.0 / (self.len as f64)
    }
}
