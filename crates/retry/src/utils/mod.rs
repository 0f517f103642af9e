//! Shared helpers for retry settings

pub mod serde;
