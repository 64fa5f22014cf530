//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Pretty or JSON console output on stderr
//! - Optional rolling JSON file sink
//! - Secret scrubbing for logged command lines

pub mod logger;
pub mod secret_scrubbing;

pub use logger::LoggerImpl;
pub use secret_scrubbing::SecretScrubber;
