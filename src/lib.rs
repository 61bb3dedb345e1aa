pub mod domain;
pub mod protocol;
pub mod shell;

mod error;

pub use error::*;
