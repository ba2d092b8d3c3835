//! Public library modules for the CLI crate
pub mod output;
pub mod paths;
pub mod watch;
