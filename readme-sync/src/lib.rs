pub mod cli;
pub mod github;
pub mod load_config;
pub mod readme;

pub use cli::{run, Cli, Commands};
