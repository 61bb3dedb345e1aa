mod config;
mod response;

pub use config::*;
pub use response::*;
