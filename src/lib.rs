pub mod arch;
pub mod cli;
pub mod config;
pub mod demo;
pub mod env;
pub mod logging;
pub mod memo;
pub mod memos;
