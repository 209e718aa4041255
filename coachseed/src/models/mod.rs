//! Seed entities of the coaching platform.

mod log_entry;
mod profile;
mod role;
mod user;

pub use log_entry::{LogEntry, LogLevel};
pub use profile::Profile;
pub use role::Role;
pub use user::User;
