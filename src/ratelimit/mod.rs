//! Rate limiting logic and state management.

mod clock;
mod key;
mod limiter;
mod rules;
mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::ActionKey;
pub use limiter::{Decision, RateLimiter, DEFAULT_MAX_TRACKED_KEYS};
pub use rules::{ActionLimit, ActionLimits, ADD_TODO, MAX_WINDOW_MS, SIGN_IN, SIGN_UP};
pub use window::SlidingWindow;
