//! CLI command handlers. Each command is in its own file.

mod config;
mod run;
mod schedule;

pub use config::run_config;
pub use run::run_command;
pub use schedule::run_schedule;

#[cfg(test)]
pub(crate) use run::{is_retryable, run_with_cancel, CommandError};
#[cfg(test)]
pub(crate) use schedule::{effective_config, schedule_rows, write_schedule, MAX_SHOWN_ROWS};
