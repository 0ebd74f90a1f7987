//! API request handlers

mod discovery;

pub use discovery::*;
