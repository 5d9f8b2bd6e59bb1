pub mod batch;
pub mod cli;
pub mod helper;
pub mod load_config;
pub mod upload;

pub use cli::{run, Cli, Commands};
