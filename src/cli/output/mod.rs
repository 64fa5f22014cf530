//! CLI output formatting module
//!
//! Provides the operation table and the call spinner.

pub mod progress;
pub mod table;

pub use progress::create_spinner;
pub use table::operations_table;
