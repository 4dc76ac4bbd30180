mod bootstrap;
mod cli;
mod error;
mod loop_runner;
mod prompt;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::{report_failure, run};
