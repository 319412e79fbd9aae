//! Core types for turnkit.

pub mod message;

pub use message::*;
