//! Standard hook implementations.

pub mod logging;
#[cfg(feature = "timeout")]
pub mod timeout;

pub use logging::LoggingHook;
#[cfg(feature = "timeout")]
pub use timeout::TimeoutHook;
