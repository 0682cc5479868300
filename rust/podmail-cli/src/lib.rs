//! Command line access to the podmail building blocks.
//!
//! Every subcommand renders its result as text so it can be tested without a
//! terminal; the `podmail` binary only parses arguments, installs logging and
//! prints.

mod cli;
pub use cli::*;
