//! A small interactive command shell with a login gate.
//!
//! Lines are split on whitespace and run either as one of a handful of
//! built-ins (`cd`, `dir`, `pwd`, `type`, `echo`, `help`, `exit`) or as an
//! external program found on `PATH`. Output of either kind can be sent to a
//! file with `>` or `>>`.
//!
//! The main entry point is [`Interpreter`]. [`login()`] and [`Terminal`] cover
//! the credential check that runs before it, and [`Config`] the settings both
//! read at startup.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
mod external;
mod interpreter;
pub mod io_adapters;
mod lexer;
pub mod login;
mod parser;
mod redirect;

pub use command::Flow;
pub use config::Config;
pub use env::Environment;
pub use interpreter::{Interpreter, LineSource};
pub use io_adapters::Terminal;
pub use login::{CredentialFile, LoginOutcome, login};
