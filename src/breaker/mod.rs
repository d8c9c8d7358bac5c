pub mod breaker;
pub mod clock;
pub mod machine;
pub mod observer;
pub mod types;
pub mod window;

pub use breaker::CircuitBreaker;
pub use clock::{Clock, MockClock, SystemClock};
pub use machine::{Admission, BreakerMachine};
pub use observer::{BreakerObserver, NoopObserver, TracingObserver};
pub use types::{
    BreakerConfig, BreakerEvent, BreakerSnapshot, BreakerState, FallbackPayload, FallbackReason,
    GuardedResult, Transition,
};
pub use window::OutcomeWindow;
