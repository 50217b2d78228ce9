pub mod clock;
pub mod diff;
pub mod metrics;
pub mod session;
pub mod submit;
pub mod text;

pub use clock::*;
pub use diff::*;
pub use metrics::*;
pub use session::*;
pub use submit::*;
pub use text::*;

const AVERAGE_WORD_LENGTH: usize = 5;

// Types for more general type-safety
type Minutes = f64;
type Float = f64;

// Get the minutes elapsed from a duration
pub(crate) fn minutes(elapsed: Duration) -> Minutes {
    elapsed.as_secs_f64() / 60.0
}
