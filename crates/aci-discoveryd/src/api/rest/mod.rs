//! REST surface: discovery documents, image blobs and keys

pub mod handlers;
pub mod router;
pub mod state;
