//! `genverify-cli`: generation verification pipeline and session.

pub mod pipeline;
pub mod session;

pub use pipeline::{execute, InputFile, RunError, RunOutput, RunParams, Source};
pub use session::Session;
