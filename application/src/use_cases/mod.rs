//! Application use cases.

pub mod exchange;
