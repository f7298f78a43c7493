pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod logging;
pub mod subscribe;
pub mod utils;
