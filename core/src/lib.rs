#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate lazy_static;

pub mod breakpoint;
pub mod build;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod notifier;
pub mod project;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod util;

pub type Result<T> = std::result::Result<T, error::ShellError>;
