pub mod catalog;
pub mod config;
pub mod errors;
pub mod output;
pub mod scanner;
pub mod shutdown;
