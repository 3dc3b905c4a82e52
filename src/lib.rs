pub mod common;
pub mod config;
pub mod handler;
pub mod imagine;
pub mod poll;

pub use common::errors::Error;
pub use config::Config;
pub use handler::VideoHandler;
