//! Process management infrastructure

pub mod runner;

pub use runner::TokioProcessRunner;
