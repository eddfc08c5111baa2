#![warn(clippy::pedantic)]
// Noisy doc/signature lints: would require annotating every pub function
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Style preference: keeping format!("{}", x) over format!("{x}") for readability with complex exprs
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub(crate) mod errors;
pub mod gateway;
pub mod line;
pub mod providers;
pub(crate) mod utils;

pub use errors::{BotError, BotResult};

/// Re-exports for fuzz targets. Not part of the public API.
#[doc(hidden)]
pub mod fuzz_api {
    /// Wrapper around `line::validate_signature` for fuzz targets.
    pub fn validate_signature(secret: &str, signature: &str, body: &[u8]) -> bool {
        crate::line::validate_signature(secret, signature, body)
    }
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
