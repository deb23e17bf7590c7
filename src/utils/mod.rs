pub mod clock;
pub mod format;
pub mod logging;

pub use clock::{Clock, ManualClock, SystemClock};
pub use format::format_hms;
