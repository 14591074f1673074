//! Observability utilities.

mod logging;
mod timer;

pub use logging::{init_logging, scan_error_log};
pub use timer::SpanTimer;
