pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod scanner;
pub mod selector;
pub mod server;
pub mod util;
pub mod workspace;
