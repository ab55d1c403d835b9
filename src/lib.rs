pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod navigation;
pub mod portal;

pub use config::PortalConfig;
pub use error::{AppError, AppResult};
pub use portal::{Navigation, Notification, Portal, Screen};

// Debug-build printing helper: eprintln! in tests and debug builds, absent otherwise.
// Usage: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
