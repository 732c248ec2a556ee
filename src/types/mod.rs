//! Core types for transcript ordering.

pub mod message;

pub use message::*;
